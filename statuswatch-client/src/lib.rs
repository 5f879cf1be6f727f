//! # statuswatch-client
//!
//! HTTP client for the public Statuspage v2 API, the JSON feed behind
//! `githubstatus.com` and most hosted status pages.
//!
//! The client decodes responses into [`statuswatch_types`] values and retries
//! transient failures with exponential backoff, so callers can treat a fetch
//! as a single fallible operation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statuswatch_client::StatusPageClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StatusPageClient::builder()
//!         .timeout(Duration::from_secs(5))
//!         .max_retries(3)
//!         .build()?;
//!
//!     let snapshot = client.summary().await?;
//!
//!     println!("{} components", snapshot.components.len());
//!     Ok(())
//! }
//! ```

mod client;
pub mod error;

pub use client::{StatusPageClient, StatusPageClientBuilder, GITHUB_STATUS_URL};
pub use error::ClientError;

// Re-export types for convenience
pub use statuswatch_types::{
    ComponentsResponse, IncidentsResponse, ScheduledMaintenancesResponse, Snapshot, StatusResponse,
};
