//! Shared test-only helpers for sozluk_core.

use crate::models::word::WordRecord;
use crate::Database;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Word records with one placeholder meaning each.
pub(crate) fn words(names: &[&str]) -> Vec<WordRecord> {
    names
        .iter()
        .map(|name| WordRecord::with_meaning(*name, format!("{} anlamı", name)))
        .collect()
}

/// Write `names` as one committed generation tagged `version`.
///
/// # Panics
/// Panics when any storage step fails.
pub(crate) fn seed_dictionary(db: &Database, version: u64, names: &[&str]) {
    let generation = db.dictionary.begin_generation().expect("begin generation");
    db.dictionary
        .write_batch(generation, &words(names))
        .expect("write batch");
    db.dictionary
        .commit_generation(generation, version)
        .expect("commit generation");
}
