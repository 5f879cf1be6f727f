//! Channel-based snapshot source.
//!
//! Serves whatever snapshot was last pushed through a tokio watch channel.
//! Useful when another part of a program already fetches the feed, and for
//! driving the monitor deterministically in tests.

use async_trait::async_trait;
use statuswatch_types::Snapshot;
use tokio::sync::watch;

use super::SnapshotSource;
use crate::error::SourceError;

/// A source that returns the latest snapshot sent on a watch channel.
///
/// # Example
///
/// ```
/// use statuswatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// `source_description` names where snapshots come from and shows up in
    /// logs.
    pub fn new(receiver: watch::Receiver<Snapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair, starting from the zero snapshot.
    pub fn create(source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

#[async_trait]
impl SnapshotSource for ChannelSource {
    async fn fetch_summary(&self) -> Result<Snapshot, SourceError> {
        // has_changed only errors once the sender is gone.
        if self.receiver.has_changed().is_err() {
            return Err(SourceError::Closed);
        }
        Ok(self.receiver.borrow().clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
