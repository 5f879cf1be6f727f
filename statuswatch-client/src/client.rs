//! Statuspage client using the public v2 HTTP API.
//!
//! Every hosted Statuspage (including `githubstatus.com`) exposes the same
//! read-only JSON endpoints under `/api/v2`. No authentication is required.
//!
//! ## Retries
//!
//! Transient failures (connection errors, timeouts, HTTP 429 and 5xx) are
//! retried with exponential backoff, starting at `retry_wait_min` and capped at
//! `retry_wait_max`. Everything else fails on the first attempt.
//!
//! ## Example
//!
//! ```rust,no_run
//! use statuswatch_client::StatusPageClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StatusPageClient::builder()
//!         .endpoint("https://www.githubstatus.com")
//!         .build()?;
//!
//!     let summary = client.summary().await?;
//!
//!     println!("{}", summary.status.description);
//!     for component in &summary.components {
//!         println!("  {}: {}", component.name, component.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use statuswatch_types::{
    ComponentsResponse, IncidentsResponse, ScheduledMaintenancesResponse, Snapshot, StatusResponse,
};

use crate::ClientError;

/// Default status page: GitHub's.
pub const GITHUB_STATUS_URL: &str = "https://www.githubstatus.com";

const SUMMARY_ENDPOINT: &str = "/api/v2/summary.json";
const STATUS_ENDPOINT: &str = "/api/v2/status.json";
const COMPONENTS_ENDPOINT: &str = "/api/v2/components.json";
const UNRESOLVED_INCIDENTS_ENDPOINT: &str = "/api/v2/incidents/unresolved.json";
const ALL_INCIDENTS_ENDPOINT: &str = "/api/v2/incidents.json";
const UPCOMING_MAINTENANCES_ENDPOINT: &str = "/api/v2/scheduled-maintenances/upcoming.json";
const ACTIVE_MAINTENANCES_ENDPOINT: &str = "/api/v2/scheduled-maintenances/active.json";
const ALL_MAINTENANCES_ENDPOINT: &str = "/api/v2/scheduled-maintenances.json";

/// Client for a Statuspage-hosted status page.
#[derive(Debug, Clone)]
pub struct StatusPageClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    retry_wait_min: Duration,
    retry_wait_max: Duration,
}

impl StatusPageClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> StatusPageClientBuilder {
        StatusPageClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the full summary: status, components, unresolved incidents and
    /// upcoming or in-progress maintenances.
    pub async fn summary(&self) -> Result<Snapshot, ClientError> {
        self.get_json(SUMMARY_ENDPOINT).await
    }

    /// Fetch the overall status.
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        self.get_json(STATUS_ENDPOINT).await
    }

    /// Fetch all components.
    pub async fn components(&self) -> Result<ComponentsResponse, ClientError> {
        self.get_json(COMPONENTS_ENDPOINT).await
    }

    /// Fetch unresolved incidents.
    pub async fn unresolved_incidents(&self) -> Result<IncidentsResponse, ClientError> {
        self.get_json(UNRESOLVED_INCIDENTS_ENDPOINT).await
    }

    /// Fetch the 50 most recent incidents.
    pub async fn all_incidents(&self) -> Result<IncidentsResponse, ClientError> {
        self.get_json(ALL_INCIDENTS_ENDPOINT).await
    }

    /// Fetch maintenances that have not started yet.
    pub async fn upcoming_scheduled_maintenances(
        &self,
    ) -> Result<ScheduledMaintenancesResponse, ClientError> {
        self.get_json(UPCOMING_MAINTENANCES_ENDPOINT).await
    }

    /// Fetch maintenances that are in progress or being verified.
    pub async fn active_scheduled_maintenances(
        &self,
    ) -> Result<ScheduledMaintenancesResponse, ClientError> {
        self.get_json(ACTIVE_MAINTENANCES_ENDPOINT).await
    }

    /// Fetch the 50 most recent maintenances.
    pub async fn all_scheduled_maintenances(
        &self,
    ) -> Result<ScheduledMaintenancesResponse, ClientError> {
        self.get_json(ALL_MAINTENANCES_ENDPOINT).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut attempt = 0;

        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let wait = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        url = %url,
                        attempt,
                        max_retries = self.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "status page request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        debug!(url = %url, "fetching");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_wait_min
            .saturating_mul(factor)
            .min(self.retry_wait_max)
    }
}

/// Builder for StatusPageClient.
#[derive(Debug, Default)]
pub struct StatusPageClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_wait_min: Option<Duration>,
    retry_wait_max: Option<Duration>,
}

impl StatusPageClientBuilder {
    /// Set the status page base URL (default: `https://www.githubstatus.com`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how many times a transient failure is retried (default: 5).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the first and the maximum backoff wait (default: 1s and 5s).
    pub fn retry_wait(mut self, min: Duration, max: Duration) -> Self {
        self.retry_wait_min = Some(min);
        self.retry_wait_max = Some(max);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<StatusPageClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(5));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statuswatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let retry_wait_min = self.retry_wait_min.unwrap_or(Duration::from_secs(1));
        let retry_wait_max = self
            .retry_wait_max
            .unwrap_or(Duration::from_secs(5))
            .max(retry_wait_min);

        Ok(StatusPageClient {
            client,
            endpoint: self
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GITHUB_STATUS_URL.to_string()),
            max_retries: self.max_retries.unwrap_or(5),
            retry_wait_min,
            retry_wait_max,
        })
    }
}
