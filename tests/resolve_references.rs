//! End-to-end resolution and passage fetching against a mocked API.Bible.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use ephrem::cache::BiblesCache;
use ephrem::config::Config;
use ephrem::{Error, FetchOptions, Session};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KJV_ID: &str = "de4e12af7f28f599-02";

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/bibles"))
        .and(header("api-key", "test-key"))
        .and(query_param("language", "eng"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": KJV_ID,
                "abbreviation": "engKJV",
                "abbreviationLocal": "KJV",
                "name": "King James (Authorised) Version",
                "language": { "id": "eng", "name": "English", "scriptDirection": "LTR" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/bibles/{KJV_ID}/books")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "GEN", "bibleId": KJV_ID, "abbreviation": "Gen", "name": "Genesis" },
                { "id": "JHN", "bibleId": KJV_ID, "abbreviation": "Jhn", "name": "John" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/bibles/{KJV_ID}/passages/JHN.3.16-JHN.3.20")))
        .and(query_param("content-type", "text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "JHN.3.16-JHN.3.20",
                "reference": "John 3:16-20",
                "content": "For God so loved the world",
                "copyright": "PUBLIC DOMAIN"
            },
            "meta": { "fums": "" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    server
}

fn config(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        api_key: "test-key".into(),
        base_url: server.uri(),
        delay_between_calls_ms: 0,
        initial_backoff_ms: 1,
        cache_dir: dir.path().to_path_buf(),
        languages: vec!["eng".into()],
        ..Config::default()
    }
}

#[tokio::test]
async fn test_resolve_then_fetch_from_cache() {
    let server = mock_api().await;
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(config(&server, &dir)).await.unwrap();
    let options = session.resolve_options();

    let groups = session.resolve("John 3:16-20 (KJV); Gen 1", &options).await.unwrap();
    assert_eq!(groups.len(), 2);
    let john = &groups[0].references[0];
    assert_eq!(john.passage_id(), "JHN.3.16-JHN.3.20");
    assert_eq!(john.bible_id, KJV_ID);
    assert_eq!(groups[1].references[0].passage_id(), "GEN.1");

    for _ in 0..2 {
        let passages = session
            .get_passages("John 3:16-20", &FetchOptions::default(), &options)
            .await
            .unwrap();
        let passage = &passages[0].passages[0].passage;
        assert_eq!(passage.data.content, "For God so loved the world");
        assert_eq!(passage.data.copyright, "PUBLIC DOMAIN");
    }
}

#[tokio::test]
async fn test_cache_survives_reload() {
    let server = mock_api().await;
    let dir = TempDir::new().unwrap();

    {
        let mut session = Session::open(config(&server, &dir)).await.unwrap();
        let options = session.resolve_options();
        session
            .get_passages("John 3:16-20 (KJV)", &FetchOptions::default(), &options)
            .await
            .unwrap();
    }

    let cache = BiblesCache::load(dir.path(), Some(30.0), chrono::Utc::now()).await;
    assert_eq!(cache.bibles["KJV"].id, KJV_ID);
    assert!(cache.book_in_bible("JHN", "engKJV"));

    // Served from disk: the mocks expect one call each
    let mut session = Session::open(config(&server, &dir)).await.unwrap();
    let options = session.resolve_options();
    let passages = session
        .get_passages("John 3:16-20 (KJV)", &FetchOptions::default(), &options)
        .await
        .unwrap();
    assert_eq!(passages[0].passages[0].reference.book, "JHN");
}

#[tokio::test]
async fn test_unknown_book_is_reported() {
    let server = mock_api().await;
    let dir = TempDir::new().unwrap();
    let mut session = Session::open(config(&server, &dir)).await.unwrap();
    let options = session.resolve_options();

    match session.resolve("Hezekiah 1:1 (KJV)", &options).await {
        Err(Error::BookNotFound { book_name, .. }) => assert_eq!(book_name, "Hezekiah"),
        other => panic!("expected BookNotFound, got {other:?}"),
    }
    server.reset().await;
}
