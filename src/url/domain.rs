use url::Url;

/// Extracts the host from a URL, lowercased and without a leading `www.`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use affairs_digest::url::extract_host;
///
/// let url = Url::parse("https://WWW.Example.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| {
        let host = h.to_lowercase();
        match host.strip_prefix("www.") {
            Some(stripped) => stripped.to_string(),
            None => host,
        }
    })
}

/// Returns true if both URLs live on the same site
///
/// Hosts are compared case-insensitively and a `www.` prefix is ignored.
/// Ports are ignored as well.
pub fn same_site(candidate: &Url, site: &Url) -> bool {
    match (extract_host(candidate), extract_host(site)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
