//! Integration tests for article fetching and batch processing
//!
//! Article pages, images and failures are served by wiremock; the store is a
//! temporary SQLite database.

mod common;

use affairs_digest::article::BlockKind;
use affairs_digest::crawler::{ArticleFetcher, BatchProcessor, HttpFetcher};
use affairs_digest::storage::{SharedStore, UrlStore};
use affairs_digest::translate::{PassthroughTranslator, Translator};
use common::*;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn batch(
    server: &MockServer,
    dir: &TempDir,
    translator: Arc<dyn Translator>,
    store: Option<SharedStore>,
) -> BatchProcessor {
    let config = test_config(&server.uri(), dir.path(), "");
    let fetcher = HttpFetcher::from_config(&config).unwrap();
    BatchProcessor::new(ArticleFetcher::new(fetcher, translator, store))
}

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([((x * 31 + y * 17) ^ (x * y)) as u8, (y * 7) as u8, (x * 3) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_missing_main_region_skips_one_article() {
    let server = MockServer::start().await;
    mount_html(&server, "/story-a", article_page("Story A", "<p>Alpha</p>")).await;
    mount_html(
        &server,
        "/story-b",
        "<html><body><div class=\"other\"><h1 id=\"list\">B</h1></div></body></html>".to_string(),
    )
    .await;
    mount_html(&server, "/story-c", article_page("Story C", "<p>Gamma</p>")).await;

    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let urls = vec![
        article_url(&server, "story-a"),
        article_url(&server, "story-b"),
        article_url(&server, "story-c"),
    ];

    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), Some(shared(&store)));
    let (records, titles) = processor.process(&urls).await;

    assert_eq!(records.len(), 2);
    assert_eq!(titles, vec!["Story A".to_string(), "Story C".to_string()]);
    assert_eq!(records[0].source_url, urls[0]);
    assert_eq!(records[1].source_url, urls[2]);
}

#[tokio::test]
async fn test_only_parsed_articles_are_marked_processed() {
    let server = MockServer::start().await;
    mount_html(&server, "/story-a", article_page("Story A", "<p>Alpha</p>")).await;
    mount_status(&server, "/story-b", 404).await;

    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let urls = vec![article_url(&server, "story-a"), article_url(&server, "story-b")];

    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), Some(shared(&store)));
    let outcome = processor.run(&urls).await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.failed, vec![urls[1].clone()]);

    let guard = store.lock().unwrap();
    assert!(guard.contains(&urls[0]).unwrap());
    assert!(!guard.contains(&urls[1]).unwrap());
    assert_eq!(guard.count().unwrap(), 1);
}

#[tokio::test]
async fn test_reprocessing_refreshes_instead_of_duplicating() {
    let server = MockServer::start().await;
    mount_html(&server, "/story-a", article_page("Story A", "<p>Alpha</p>")).await;

    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    let urls = vec![article_url(&server, "story-a")];

    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), Some(shared(&store)));
    processor.process(&urls).await;
    let first = store.lock().unwrap().get_record(&urls[0]).unwrap().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    processor.process(&urls).await;
    let second = store.lock().unwrap().get_record(&urls[0]).unwrap().unwrap();

    assert_eq!(store.lock().unwrap().count().unwrap(), 1);
    assert!(second.scraped_at >= first.scraped_at);
}

#[tokio::test]
async fn test_blocks_are_translated_in_reading_order() {
    let server = MockServer::start().await;
    let body = r#"
        <p>RBI kept the repo rate at 6.5%.</p>
        <h2>Key decisions</h2>
        <ol><li>Repo rate unchanged</li><li>Stance retained</li></ol>
        <ul><li>Inflation target 4%</li></ul>
        <ol><li>Next review in June</li></ol>
    "#;
    mount_html(&server, "/rbi-policy", article_page("RBI policy", body)).await;

    let dir = TempDir::new().unwrap();
    let processor = batch(&server, &dir, Arc::new(TaggingTranslator), None);
    let (records, _) = processor.process(&[article_url(&server, "rbi-policy")]).await;

    let record = &records[0];
    assert_eq!(record.title_primary(), "RBI policy");
    assert_eq!(record.title_translated(), "gu:RBI policy");

    let kinds: Vec<BlockKind> = record.content_blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Paragraph,
            BlockKind::Heading1,
            BlockKind::NumberedItem(1),
            BlockKind::NumberedItem(2),
            BlockKind::BulletItem,
            BlockKind::NumberedItem(3),
        ]
    );

    for block in &record.content_blocks {
        assert_eq!(block.text.translated, format!("gu:{}", block.text.original));
    }

    let texts: Vec<&str> = record
        .content_blocks
        .iter()
        .map(|b| b.text.original.as_str())
        .collect();
    assert!(!texts.iter().any(|t| t.contains("Home »") || t.contains("Leave a Reply")));
}

#[tokio::test]
async fn test_featured_image_normalised_to_png() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/story-a",
        article_page(
            "Story A",
            r#"<img class="post-featured-image" src="/uploads/a.png"><p>Alpha</p>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/uploads/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), None);
    let (records, _) = processor.process(&[article_url(&server, "story-a")]).await;

    let image = records[0].image.as_ref().expect("image should be attached");
    assert_eq!(image::guess_format(image).unwrap(), ImageFormat::Png);
    let decoded = image::load_from_memory(image).unwrap();
    assert!(!decoded.color().has_alpha());
}

#[tokio::test]
async fn test_broken_image_degrades_to_no_image() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/story-a",
        article_page(
            "Story A",
            r#"<img class="post-featured-image" src="/uploads/missing.png"><p>Alpha</p>"#,
        ),
    )
    .await;
    mount_status(&server, "/uploads/missing.png", 404).await;
    mount_html(
        &server,
        "/story-b",
        article_page(
            "Story B",
            r#"<img class="post-featured-image" src="/uploads/tiny.png"><p>Beta</p>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/uploads/tiny.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 20]))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), None);
    let (records, _) = processor
        .process(&[article_url(&server, "story-a"), article_url(&server, "story-b")])
        .await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.image.is_none()));
}

#[tokio::test]
async fn test_store_write_failure_keeps_record() {
    let server = MockServer::start().await;
    mount_html(&server, "/story-a", article_page("Story A", "<p>Alpha</p>")).await;

    let dir = TempDir::new().unwrap();
    let store: SharedStore = Arc::new(Mutex::new(OfflineStore));
    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), Some(store));

    let (records, titles) = processor.process(&[article_url(&server, "story-a")]).await;
    assert_eq!(records.len(), 1);
    assert_eq!(titles, vec!["Story A".to_string()]);
}

#[tokio::test]
async fn test_empty_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), None);

    let (records, titles) = processor.process(&[]).await;
    assert!(records.is_empty());
    assert!(titles.is_empty());
}

#[tokio::test]
async fn test_concurrent_batch_preserves_input_order() {
    let server = MockServer::start().await;
    let slugs = ["one", "two", "three", "four"];
    for slug in slugs {
        mount_html(
            &server,
            &format!("/{}", slug),
            article_page(&format!("Title {}", slug), "<p>Body</p>"),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let urls: Vec<String> = slugs.iter().map(|s| article_url(&server, s)).collect();
    let processor = batch(&server, &dir, Arc::new(PassthroughTranslator), None).with_concurrency(4);

    let (_, titles) = processor.process(&urls).await;
    assert_eq!(
        titles,
        vec!["Title one", "Title two", "Title three", "Title four"]
    );
}
