//! Status page API source.

use async_trait::async_trait;
use statuswatch_client::StatusPageClient;
use statuswatch_types::Snapshot;

use super::SnapshotSource;
use crate::error::SourceError;

/// Fetches the summary endpoint of a status page.
#[derive(Debug, Clone)]
pub struct StatusPageSource {
    client: StatusPageClient,
    description: String,
}

impl StatusPageSource {
    pub fn new(client: StatusPageClient) -> Self {
        let description = format!("statuspage: {}", client.endpoint());
        Self { client, description }
    }

    pub fn client(&self) -> &StatusPageClient {
        &self.client
    }
}

#[async_trait]
impl SnapshotSource for StatusPageSource {
    async fn fetch_summary(&self) -> Result<Snapshot, SourceError> {
        Ok(self.client.summary().await?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
