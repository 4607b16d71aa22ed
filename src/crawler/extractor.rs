//! Link extraction from listing pages
//!
//! A listing page is searched by a small ordered list of strategies, each a
//! pure function from a parsed page to candidate URLs. Their results are
//! unioned into a [`LinkSet`], so a teaser found by two strategies is kept
//! once, at the position where it was first seen.

use crate::url::{resolve_candidate, same_site, should_include};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static SEL_POST_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.post-data").unwrap());
static SEL_HOME_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.home-post-item").unwrap());
static SEL_DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static SEL_H3: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").unwrap());
static SEL_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A link-extraction strategy: parsed listing page and its URL in, candidate
/// article URLs out
pub type Strategy = fn(&Html, &Url) -> Vec<String>;

/// Strategies in the order they are applied, most specific first
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("teaser-card", teaser_cards),
    ("home-item", home_items),
    ("catch-all", heading_links),
];

/// An insertion-ordered set of URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL unless it is already present
    ///
    /// # Returns
    ///
    /// `true` if the URL was new
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    /// Adds every URL of `other` that is not already present, keeping order
    pub fn merge(&mut self, other: LinkSet) {
        for url in other.urls {
            self.insert(url);
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

/// Extracts candidate article links from a listing page
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `page_url` - The listing page URL, used to resolve relative links
///
/// # Returns
///
/// The union of all strategies' results, deduplicated, every entry having
/// passed [`should_include`]
///
/// # Example
///
/// ```
/// use affairs_digest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<div class="post-data"><h3><a href="/rbi-policy">RBI</a></h3></div>"#;
/// let page = Url::parse("https://example.com/current-affairs/").unwrap();
/// let links = extract_links(html, &page);
/// assert_eq!(links.as_slice(), ["https://example.com/rbi-policy"]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> LinkSet {
    let document = Html::parse_document(html);
    extract_from_document(&document, page_url)
}

/// Applies every strategy in [`STRATEGIES`] to an already parsed page
pub fn extract_from_document(document: &Html, page_url: &Url) -> LinkSet {
    let mut links = LinkSet::new();

    for (name, strategy) in STRATEGIES {
        let found = strategy(document, page_url);
        let before = links.len();
        for url in found {
            if should_include(&url) {
                links.insert(url);
            }
        }
        tracing::trace!(strategy = name, added = links.len() - before, "Strategy applied");
    }

    links
}

/// Teaser cards: `div.post-data` → first `h3` → first link
pub fn teaser_cards(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(&SEL_POST_DATA)
        .filter_map(|container| first_heading_link(container, page_url))
        .collect()
}

/// Home listing items: `div.home-post-item` → first `h3` → first link
pub fn home_items(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(&SEL_HOME_ITEM)
        .filter_map(|container| first_heading_link(container, page_url))
        .collect()
}

/// Catch-all: any `div` → first `h3` → first link
///
/// Broad enough to pick up pagination and section links, so a link is kept
/// only when it stays on the listing site's host, is not a `/page/` link and
/// does not end in `/`.
pub fn heading_links(document: &Html, page_url: &Url) -> Vec<String> {
    document
        .select(&SEL_DIV)
        .filter_map(|container| first_heading_link(container, page_url))
        .filter(|url| {
            !url.contains("/page/")
                && !url.ends_with('/')
                && Url::parse(url)
                    .map(|parsed| same_site(&parsed, page_url))
                    .unwrap_or(false)
        })
        .collect()
}

fn first_heading_link(container: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let heading = container.select(&SEL_H3).next()?;
    let anchor = heading.select(&SEL_LINK).next()?;
    let href = anchor.value().attr("href")?;
    resolve_candidate(href, page_url)
}
