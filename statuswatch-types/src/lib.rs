//! # statuswatch-types
//!
//! Core types for status page observability. This crate defines the data
//! model of an Atlassian Statuspage summary (the format served by
//! `githubstatus.com` and most hosted status pages) so that clients, change
//! detectors and notifiers can share one schema.
//!
//! ## Design Goals
//!
//! - **Lenient decoding**: unknown status values decode to an `Other`
//!   variant holding the raw string instead of rejecting the whole document
//! - **Optional serialization**: enable the `serde` feature (on by default)
//! - **Ergonomic builders**: fluent API for constructing snapshots in tests
//!   and offline tooling
//!
//! ## Example
//!
//! ```rust
//! use statuswatch_types::{Component, ComponentStatus, Indicator, Snapshot};
//! use chrono::{TimeZone, Utc};
//!
//! let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
//!
//! let snapshot = Snapshot::builder()
//!     .updated_at(at)
//!     .status(Indicator::Minor, "Partially Degraded Service")
//!     .component(Component::new("Git Operations", ComponentStatus::PartialOutage, at))
//!     .component(Component::new("API Requests", ComponentStatus::Operational, at))
//!     .build();
//!
//! assert_eq!(snapshot.components.len(), 2);
//! assert!(!snapshot.is_bootstrap());
//! ```

mod resources;
mod responses;
mod snapshot;
mod status;

pub use resources::*;
pub use responses::*;
pub use snapshot::*;
pub use status::*;

/// Re-exported so downstream crates name the same timestamp type.
pub use chrono::{DateTime, Utc};

/// Timestamp type used for every `*_at` field.
pub type Timestamp = DateTime<Utc>;
