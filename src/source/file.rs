//! File-based snapshot source.
//!
//! Reads a status page summary document from disk on every fetch. Point it at
//! a file that another process rewrites to replay a captured feed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use statuswatch_types::Snapshot;

use super::SnapshotSource;
use crate::error::SourceError;

/// A source that reads summary JSON from a file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn fetch_summary(&self) -> Result<Snapshot, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
