//! Remote data manifest (`metadata.json`).

use serde::{Deserialize, Serialize};

/// Describes one published version of the offline dictionary.
///
/// A version is immutable; a new version ships a new file list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub version: u64,
    pub files: Vec<String>,
}

impl Metadata {
    /// Reject manifests that cannot drive an ingest run.
    ///
    /// # Errors
    /// Returns a message when the file list is empty or names a path
    /// outside the data folder.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err(format!("manifest version {} lists no files", self.version));
        }
        for file in &self.files {
            let trimmed = file.trim();
            if trimmed.is_empty() || trimmed.contains("..") || trimmed.starts_with('/') {
                return Err(format!("manifest lists invalid file name '{}'", file));
            }
        }
        Ok(())
    }
}
