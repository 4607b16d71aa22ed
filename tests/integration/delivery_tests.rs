//! Integration tests for translation, rendering, delivery and full runs

mod common;

use affairs_digest::config::TranslationConfig;
use affairs_digest::output::{HtmlRenderer, Renderer, Sender, TelegramSender};
use affairs_digest::pipeline::DigestPipeline;
use affairs_digest::retry::RetryPolicy;
use affairs_digest::storage::{RunLog, RunStatus, SqliteStorage, UrlStore};
use affairs_digest::translate::{GoogleTranslator, Translator};
use affairs_digest::{ArticleRecord, BilingualText, BlockKind, ContentBlock, DigestError};
use chrono::NaiveDate;
use common::*;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:test-token";

fn translator_for(server: &MockServer, chunk_size: usize) -> GoogleTranslator {
    let config = TranslationConfig {
        endpoint: format!("{}/translate_a/single", server.uri()),
        chunk_size,
        min_delay_ms: 0,
        max_delay_ms: 0,
        ..TranslationConfig::default()
    };
    GoogleTranslator::from_config(&config, Client::new())
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)).without_jitter())
}

async fn mount_telegram(server: &MockServer, method_name: &str, status: u16, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/{}", TOKEN, method_name)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"ok": status == 200})))
        .expect(times)
        .mount(server)
        .await;
}

fn sender_for(server: &MockServer) -> TelegramSender {
    TelegramSender::new(Client::new(), &server.uri(), Some(TOKEN.to_string()), "@TestChannel")
}

#[tokio::test]
async fn test_translator_sends_gtx_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("client", "gtx"))
        .and(query_param("sl", "en"))
        .and(query_param("tl", "gu"))
        .and(query_param("q", "Repo rate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["રેપો રેટ", "Repo rate"]]])))
        .expect(1)
        .mount(&server)
        .await;

    let translator = translator_for(&server, 4000);
    assert_eq!(translator.translate("Repo rate").await, "રેપો રેટ");
}

#[tokio::test]
async fn test_translator_chunks_long_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["અ", "x"]]])))
        .expect(3)
        .mount(&server)
        .await;

    let text = "word ".repeat(50);
    let translator = translator_for(&server, 100);
    assert_eq!(translator.translate(&text).await, "અ અ અ");
}

#[tokio::test]
async fn test_translator_falls_back_to_source_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let translator = translator_for(&server, 4000);
    assert_eq!(translator.translate("Budget session").await, "Budget session");
}

#[tokio::test]
async fn test_translator_recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["બજેટ", "Budget"]]])))
        .mount(&server)
        .await;

    let translator = translator_for(&server, 4000);
    assert_eq!(translator.translate("Budget").await, "બજેટ");
}

#[tokio::test]
async fn test_renderer_writes_dated_document() {
    let dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
    let renderer = HtmlRenderer::new(dir.path().join("out"), "Current_Affairs", "Current Affairs", date);

    let record = ArticleRecord {
        source_url: "https://example.com/a".to_string(),
        title: BilingualText::new("Title", "શીર્ષક"),
        image: None,
        content_blocks: vec![ContentBlock::new(
            BlockKind::Heading1,
            BilingualText::new("Section", "વિભાગ"),
        )],
    };

    let path = renderer.render(&[record], &["Title".to_string()]).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "07-05-2024_Current_Affairs.html"
    );

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("<h3 class=\"translated\">વિભાગ</h3>"));
    assert!(html.contains("<h3 class=\"original\">Section</h3>"));
}

#[tokio::test]
async fn test_telegram_sends_document() {
    let server = MockServer::start().await;
    mount_telegram(&server, "sendDocument", 200, 1).await;
    mount_telegram(&server, "sendMessage", 200, 0).await;

    let dir = TempDir::new().unwrap();
    let document = dir.path().join("digest.html");
    std::fs::write(&document, "<html></html>").unwrap();

    assert!(sender_for(&server).send(&document, "Current Affairs").await);
}

#[tokio::test]
async fn test_telegram_long_summary_follows_as_message() {
    let server = MockServer::start().await;
    mount_telegram(&server, "sendDocument", 200, 1).await;
    mount_telegram(&server, "sendMessage", 200, 1).await;

    let dir = TempDir::new().unwrap();
    let document = dir.path().join("digest.html");
    std::fs::write(&document, "<html></html>").unwrap();

    let summary = "topic ".repeat(400);
    assert!(sender_for(&server).send(&document, &summary).await);
}

#[tokio::test]
async fn test_telegram_rejection_reported_as_false() {
    let server = MockServer::start().await;
    mount_telegram(&server, "sendDocument", 400, 1).await;

    let dir = TempDir::new().unwrap();
    let document = dir.path().join("digest.html");
    std::fs::write(&document, "<html></html>").unwrap();

    assert!(!sender_for(&server).send(&document, "Current Affairs").await);
}

#[tokio::test]
async fn test_full_run_then_fallback_run() {
    let server = MockServer::start().await;
    mount_html(&server, LISTING, listing_page(&["/story-a", "/story-b"])).await;
    mount_html(&server, "/story-a", article_page("Story A", "<p>Alpha</p>")).await;
    mount_html(&server, "/story-b", article_page("Story B", "<p>Beta</p>")).await;
    mount_telegram(&server, "sendDocument", 200, 2).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path(), "");

    let pipeline = DigestPipeline::from_config(config.clone(), "hash-1")
        .unwrap()
        .with_translator(Arc::new(TaggingTranslator))
        .with_sender(Some(Box::new(sender_for(&server))));

    let first = pipeline.run(true).await.unwrap();
    assert_eq!(first.status, RunStatus::Completed);
    assert!(!first.work.used_fallback());
    assert_eq!(first.titles, vec!["Story A".to_string(), "Story B".to_string()]);
    assert!(first.delivered);
    let document = first.document.clone().unwrap();
    assert!(document.exists());
    let html = std::fs::read_to_string(&document).unwrap();
    assert!(html.contains("gu:Alpha"));

    let second = pipeline.run(true).await.unwrap();
    assert!(second.work.used_fallback());
    assert_eq!(second.work.delta, 0);
    assert_eq!(second.titles.len(), 2);

    let ledger = SqliteStorage::new(&dir.path().join("digest.db")).unwrap();
    let runs = ledger.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r.status == RunStatus::Completed));
    assert!(runs.iter().all(|r| r.config_hash == "hash-1"));
    assert!(runs[0].summary.used_fallback);
    assert_eq!(runs[1].summary.delta, 2);
}

#[tokio::test]
async fn test_run_without_candidates_fails() {
    let server = MockServer::start().await;
    mount_html(&server, LISTING, listing_page(&["/daily-quiz"])).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path(), "");
    let pipeline = DigestPipeline::from_config(config, "hash").unwrap();

    let result = pipeline.run(false).await;
    assert!(matches!(result, Err(DigestError::NoCandidates)));

    let ledger = SqliteStorage::new(&dir.path().join("digest.db")).unwrap();
    let runs = ledger.recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Failed);
}

#[tokio::test]
async fn test_run_with_no_scrapable_articles_is_nothing_to_do() {
    let server = MockServer::start().await;
    mount_html(&server, LISTING, listing_page(&["/story-a"])).await;
    mount_html(&server, "/story-a", "<html><body><p>moved</p></body></html>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path(), "");
    let pipeline = DigestPipeline::from_config(config, "hash").unwrap();

    let report = pipeline.run(true).await.unwrap();
    assert_eq!(report.status, RunStatus::NothingToDo);
    assert!(report.document.is_none());
    assert_eq!(report.failed.len(), 1);
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_failed_crawl_closes_the_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), dir.path(), "");
    config.site.base_url = "not a url".to_string();

    let pipeline = DigestPipeline::from_config(config, "hash").unwrap();
    assert!(pipeline.run(false).await.is_err());

    let ledger = SqliteStorage::new(&dir.path().join("digest.db")).unwrap();
    let runs = ledger.recent_runs(1).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].finished_at.is_some());
}

#[tokio::test]
async fn test_planning_does_not_create_the_store() {
    let server = MockServer::start().await;
    mount_html(&server, LISTING, listing_page(&["/story-a", "/story-b"])).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path(), "");
    let pipeline = DigestPipeline::for_planning(config, "hash").unwrap();

    let work = pipeline.plan().await.unwrap();
    assert_eq!(work.urls.len(), 2);
    assert!(!dir.path().join("digest.db").exists());
}

#[tokio::test]
async fn test_planning_reads_existing_store() {
    let server = MockServer::start().await;
    mount_html(&server, LISTING, listing_page(&["/story-a", "/story-b"])).await;

    let dir = TempDir::new().unwrap();
    let store = open_store(dir.path());
    seed_store(&store, &[article_url(&server, "story-a")]);

    let config = test_config(&server.uri(), dir.path(), "");
    let pipeline = DigestPipeline::for_planning(config, "hash").unwrap();

    let work = pipeline.plan().await.unwrap();
    assert_eq!(work.urls, vec![article_url(&server, "story-b")]);
    assert_eq!(store.lock().unwrap().count().unwrap(), 1);
}
