//! Article fetching and parsing
//!
//! [`parse_article`] is synchronous and returns owned data: the parsed
//! document never lives across an await point. [`ArticleFetcher`] wraps it
//! with the network work (page, featured image), translation and the
//! processed-URL bookkeeping.

use crate::article::{ArticleRecord, BilingualText, BlockKind, ContentBlock};
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::image::normalize_image;
use crate::storage::{lock_store, SharedStore};
use crate::translate::Translator;
use crate::{DigestError, Result};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

static SEL_MAIN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main#main.site-main").unwrap());
static SEL_MAIN_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.inside_post.column.content_width").unwrap());
static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1#list").unwrap());
static SEL_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.post-featured-image[src]").unwrap());
static SEL_IMAGE_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.featured_image img[src]").unwrap());
static SEL_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h2, h3, h4, ul, ol").unwrap());
static SEL_LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

/// Ids and classes of page furniture that is not article content
const NON_CONTENT_MARKERS: &[&str] = &[
    "comments",
    "respond",
    "sharethis-inline-share-buttons",
    "sharedaddy",
    "related-articles",
    "related-posts",
    "breadcrumb",
    "post-meta",
    "entry-meta",
    "post-tags",
];

/// Leading text of metadata and breadcrumb blocks
const NON_CONTENT_PREFIXES: &[&str] = &[
    "Home »",
    "Posted on",
    "Tags:",
    "Leave a Reply",
    "Share this",
];

/// A content block before translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// An article page reduced to the parts the digest uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,

    /// Absolute URL of the featured image, if the page has one
    pub image_url: Option<String>,

    pub blocks: Vec<RawBlock>,
}

/// Parses an article page
///
/// # Arguments
///
/// * `html` - The article page body
/// * `page_url` - The article URL, used to resolve a relative image source
/// * `ancestor_depth` - How many ancestor levels are checked for
///   non-content markers
///
/// # Returns
///
/// * `Ok(ParsedArticle)` - Title, optional image URL and content blocks
/// * `Err(DigestError::MissingElement)` - No main content region or no title
pub fn parse_article(html: &str, page_url: &Url, ancestor_depth: usize) -> Result<ParsedArticle> {
    let document = Html::parse_document(html);

    let main = document
        .select(&SEL_MAIN)
        .next()
        .or_else(|| document.select(&SEL_MAIN_FALLBACK).next())
        .ok_or_else(|| DigestError::MissingElement {
            url: page_url.to_string(),
            element: "main content region",
        })?;

    let title = main
        .select(&SEL_TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DigestError::MissingElement {
            url: page_url.to_string(),
            element: "title heading",
        })?;

    let image_url = main
        .select(&SEL_IMAGE)
        .next()
        .or_else(|| document.select(&SEL_IMAGE_FALLBACK).next())
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| page_url.join(src.trim()).ok())
        .map(String::from);

    Ok(ParsedArticle {
        title,
        image_url,
        blocks: extract_blocks(main, ancestor_depth),
    })
}

/// Collects content blocks from the main region in document order
fn extract_blocks(main: ElementRef<'_>, ancestor_depth: usize) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut numbered = 0usize;

    for element in main.select(&SEL_CONTENT) {
        if inside_list(element, main) || is_non_content(element, ancestor_depth) {
            continue;
        }

        let kind = match element.value().name() {
            "p" => BlockKind::Paragraph,
            "h2" => BlockKind::Heading1,
            "h3" | "h4" => BlockKind::Heading2,
            "ul" | "ol" => {
                let ordered = element.value().name() == "ol";
                for item in element.select(&SEL_LIST_ITEM) {
                    let text = element_text(item);
                    if text.is_empty() || has_non_content_text(&text) {
                        continue;
                    }
                    let kind = if ordered {
                        numbered += 1;
                        BlockKind::NumberedItem(numbered)
                    } else {
                        BlockKind::BulletItem
                    };
                    blocks.push(RawBlock { kind, text });
                }
                continue;
            }
            _ => continue,
        };

        let text = element_text(element);
        if text.is_empty() || has_non_content_text(&text) {
            continue;
        }
        blocks.push(RawBlock { kind, text });
    }

    blocks
}

/// Whitespace-collapsed text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if the element sits inside a list that is emitted as a whole
fn inside_list(element: ElementRef<'_>, main: ElementRef<'_>) -> bool {
    for ancestor in element.ancestors() {
        if ancestor == *main {
            return false;
        }
        if let Some(el) = ancestor.value().as_element() {
            if matches!(el.name(), "ul" | "ol" | "li") {
                return true;
            }
        }
    }
    false
}

/// True if the element or one of its nearest ancestors is page furniture
fn is_non_content(element: ElementRef<'_>, depth: usize) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors())
        .take(depth + 1)
        .filter_map(|node| node.value().as_element())
        .any(|el| {
            el.id().is_some_and(|id| NON_CONTENT_MARKERS.contains(&id))
                || el.classes().any(|c| NON_CONTENT_MARKERS.contains(&c))
        })
}

fn has_non_content_text(text: &str) -> bool {
    NON_CONTENT_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

/// Fetches, parses and translates single articles
#[derive(Clone)]
pub struct ArticleFetcher {
    fetcher: HttpFetcher,
    translator: Arc<dyn Translator>,
    store: Option<SharedStore>,
    ancestor_depth: usize,
}

impl ArticleFetcher {
    /// Creates an article fetcher
    ///
    /// # Arguments
    ///
    /// * `fetcher` - HTTP fetcher for pages and images
    /// * `translator` - Translation service for titles and blocks
    /// * `store` - Where successfully parsed URLs are recorded, if available
    pub fn new(
        fetcher: HttpFetcher,
        translator: Arc<dyn Translator>,
        store: Option<SharedStore>,
    ) -> Self {
        Self {
            fetcher,
            translator,
            store,
            ancestor_depth: 6,
        }
    }

    pub fn with_ancestor_depth(mut self, depth: usize) -> Self {
        self.ancestor_depth = depth;
        self
    }

    /// Fetches one article and builds its record
    ///
    /// The URL is recorded as processed only after the page parsed
    /// successfully; a failed store write is logged and the record is still
    /// returned. An unavailable featured image leaves the record without one.
    ///
    /// # Returns
    ///
    /// * `Ok(ArticleRecord)` - The scraped and translated article
    /// * `Err(DigestError)` - Network failure or missing page structure
    pub async fn fetch(&self, url: &str) -> Result<ArticleRecord> {
        let body = self.fetcher.fetch_text(url).await?;
        let page_url = Url::parse(url)?;
        let parsed = parse_article(&body, &page_url, self.ancestor_depth)?;

        tracing::debug!(
            url,
            title = %parsed.title,
            blocks = parsed.blocks.len(),
            has_image = parsed.image_url.is_some(),
            "Article parsed"
        );

        let image = match &parsed.image_url {
            Some(image_url) => self.load_image(image_url).await,
            None => None,
        };

        let title = self.bilingual(parsed.title).await;

        let mut content_blocks = Vec::with_capacity(parsed.blocks.len());
        for block in parsed.blocks {
            let text = self.bilingual(block.text).await;
            content_blocks.push(ContentBlock::new(block.kind, text));
        }

        self.mark_processed(url);

        Ok(ArticleRecord {
            source_url: url.to_string(),
            title,
            image,
            content_blocks,
        })
    }

    async fn bilingual(&self, original: String) -> BilingualText {
        let translated = self.translator.translate(&original).await;
        BilingualText::new(original, translated)
    }

    async fn load_image(&self, image_url: &str) -> Option<Vec<u8>> {
        let result = match self.fetcher.fetch_bytes(image_url).await {
            Ok(bytes) => normalize_image(image_url, &bytes),
            Err(e) => Err(e),
        };

        match result {
            Ok(png) => Some(png),
            Err(e) => {
                tracing::warn!(url = image_url, error = %e, "Featured image unavailable");
                None
            }
        }
    }

    fn mark_processed(&self, url: &str) {
        let Some(store) = &self.store else {
            return;
        };

        let result =
            lock_store(store).and_then(|mut guard| guard.insert_or_update(url, Utc::now()));

        if let Err(e) = result {
            tracing::warn!(url, error = %e, "Failed to record processed URL");
        }
    }
}
