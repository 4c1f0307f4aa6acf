//! Smoke test for the root facade: sync a dictionary and serve a lookup.

use axum_test::TestServer;
use sozluk::models::word::WordRecord;
use sozluk::sync::MemorySource;
use sozluk::{create_app, AppState, Config, Database, SyncStatus};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn facade_serves_synced_words() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = Config::from_lookup(|_| None);
    config.db_path = temp_dir
        .path()
        .join("db")
        .to_str()
        .expect("db path")
        .to_string();
    config.api_keys = vec!["k".to_string()];

    let db = Database::new(&config.db_path).expect("open db");
    let source = Arc::new(MemorySource::default());
    source.publish(
        42,
        vec![(
            "a.json".to_string(),
            vec![WordRecord::with_meaning("çiçek", "Bitkilerin üreme organı")],
        )],
    );
    let state = AppState::with_source(config, db, source);
    assert_eq!(
        state.sync.download().await.expect("download"),
        SyncStatus::UpToDate { version: 42 }
    );

    let server = TestServer::new(create_app(state, false)).expect("server");
    let response = server
        .get("/api/v1/word/cicek")
        .add_header("x-api-key", "k")
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    assert_eq!(response.json::<WordRecord>().name, "çiçek");
}
