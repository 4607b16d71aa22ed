//! URL handling module for Affairs-Digest
//!
//! This module provides candidate URL normalization, host comparison and the
//! article inclusion filter applied to every discovered link.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, same_site};
pub use filter::should_include;
pub use normalize::{normalize_url, resolve_candidate};

/// Builds the URL of a listing page
///
/// Page 1 is the bare base URL; later pages append `page/<n>/` to it.
///
/// # Examples
///
/// ```
/// use affairs_digest::url::listing_page_url;
///
/// let base = "https://example.com/current-affairs/";
/// assert_eq!(listing_page_url(base, 1), "https://example.com/current-affairs/");
/// assert_eq!(listing_page_url(base, 3), "https://example.com/current-affairs/page/3/");
/// ```
pub fn listing_page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        return base_url.to_string();
    }

    if base_url.ends_with('/') {
        format!("{}page/{}/", base_url, page)
    } else {
        format!("{}/page/{}/", base_url, page)
    }
}
