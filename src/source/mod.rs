//! Snapshot source abstraction.
//!
//! The monitor pulls one [`Snapshot`] per tick from a [`SnapshotSource`]. The
//! production source talks to the status page API; the file and channel
//! sources replay captured feeds or let an embedding program push snapshots.

mod channel;
mod file;
mod status_page;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use status_page::StatusPageSource;

use std::fmt::Debug;

use async_trait::async_trait;
use statuswatch_types::Snapshot;

use crate::error::SourceError;

/// Where snapshots come from.
///
/// # Example
///
/// ```no_run
/// use statuswatch::{FileSource, SnapshotSource};
///
/// # async fn example() -> Result<(), statuswatch::SourceError> {
/// let source = FileSource::new("summary.json");
/// let snapshot = source.fetch_summary().await?;
/// println!("{}", snapshot.status.description);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SnapshotSource: Send + Sync + Debug {
    /// Fetch the current snapshot.
    async fn fetch_summary(&self) -> Result<Snapshot, SourceError>;

    /// Human readable description, used in logs.
    fn description(&self) -> &str;
}
