//! Shared fixtures for the integration tests

#![allow(dead_code)]

use affairs_digest::config::{parse_config, Config};
use affairs_digest::storage::{
    ProcessedUrlRecord, SharedStore, SqliteStorage, StorageError, StorageResult, UrlStore,
};
use affairs_digest::translate::Translator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Listing path served by the mock site
pub const LISTING: &str = "/current-affairs/";

/// Absolute URL of an article on the mock site
pub fn article_url(server: &MockServer, slug: &str) -> String {
    format!("{}/{}", server.uri(), slug)
}

/// Builds a configuration pointing at a mock server
pub fn test_config(server_uri: &str, dir: &Path, extra: &str) -> Config {
    let toml = format!(
        r#"
[site]
base-url = "{server}{listing}"
page-count = 3
{extra}

[crawler]
request-timeout-secs = 5
image-timeout-secs = 5
max-retries = 2
retry-base-delay-ms = 1

[storage]
database-path = "{db}"

[translation]
enabled = false

[output]
directory = "{out}"
"#,
        server = server_uri,
        listing = LISTING,
        extra = extra,
        db = dir.join("digest.db").display(),
        out = dir.join("out").display(),
    );
    parse_config(&toml).expect("test config should parse")
}

/// A listing page with one teaser card per link
pub fn listing_page(links: &[&str]) -> String {
    let cards: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<div class="post-data"><h3><a href="{}">Story</a></h3><p>Teaser</p></div>"#,
                href
            )
        })
        .collect();
    format!("<html><body><div class=\"posts\">{}</div></body></html>", cards)
}

/// An article page in the current template
pub fn article_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><body>
        <main id="main" class="site-main">
            <div class="breadcrumb"><p>Home » Current Affairs</p></div>
            <h1 id="list">{}</h1>
            {}
            <div id="comments"><p>Leave a Reply</p></div>
        </main>
        </body></html>"#,
        title, body
    )
}

pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Opens a file-backed store in `dir`
pub fn open_store(dir: &Path) -> Arc<Mutex<SqliteStorage>> {
    let storage = SqliteStorage::new(&dir.join("digest.db")).expect("store should open");
    Arc::new(Mutex::new(storage))
}

pub fn shared(store: &Arc<Mutex<SqliteStorage>>) -> SharedStore {
    store.clone()
}

/// Marks URLs as processed
pub fn seed_store(store: &Arc<Mutex<SqliteStorage>>, urls: &[String]) {
    let mut guard = store.lock().unwrap();
    for url in urls {
        guard.insert_or_update(url, Utc::now()).unwrap();
    }
}

/// Translator that tags text so tests can tell translated from original
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            String::new()
        } else {
            format!("gu:{}", text)
        }
    }
}

/// A store whose backing database is gone
pub struct OfflineStore;

fn offline<T>() -> StorageResult<T> {
    Err(StorageError::Io(std::io::Error::other("database is offline")))
}

impl UrlStore for OfflineStore {
    fn contains(&self, _url: &str) -> StorageResult<bool> {
        offline()
    }

    fn insert_or_update(&mut self, _url: &str, _scraped_at: DateTime<Utc>) -> StorageResult<()> {
        offline()
    }

    fn list_all(&self) -> StorageResult<HashSet<String>> {
        offline()
    }

    fn get_record(&self, _url: &str) -> StorageResult<Option<ProcessedUrlRecord>> {
        offline()
    }

    fn count(&self) -> StorageResult<u64> {
        offline()
    }

    fn latest_scraped_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        offline()
    }
}
