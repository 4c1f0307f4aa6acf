//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use sozluk_core::models::word::WordRecord;
use sozluk_core::sync::MemorySource;
use sozluk_server::{create_app, AppState, Config, Database};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) const API_KEY: &str = "public-key";
pub(crate) const ADMIN_KEY: &str = "admin-key";

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    let mut config = Config::from_lookup(|_| None);
    config.port = 0;
    config.db_path = db_path.to_str().expect("db path").to_string();
    config.api_keys = vec![API_KEY.to_string()];
    config.admin_api_key = Some(ADMIN_KEY.to_string());
    config
}

pub(crate) struct TestApp {
    pub server: TestServer,
    pub source: Arc<MemorySource>,
    pub state: AppState,
    _temp: TempDir,
}

pub(crate) fn setup_test_server() -> TestApp {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("db"));
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let source = Arc::new(MemorySource::default());
    let state = AppState::with_source(config, db, source.clone());
    let server = TestServer::new(create_app(state.clone(), false)).expect("server");
    TestApp {
        server,
        source,
        state,
        _temp: temp_dir,
    }
}

pub(crate) fn release(source: &MemorySource, version: u64, names: &[&str]) {
    let records = names
        .iter()
        .map(|name| WordRecord::with_meaning(*name, format!("{} anlamı", name)))
        .collect();
    source.publish(version, vec![("words.json".to_string(), records)]);
}
