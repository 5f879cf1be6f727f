//! Notifier abstraction for relaying change messages.
//!
//! The monitor hands every [`Message`] to each registered [`Notifier`]. Built
//! in backends write to stdout, append to a file, or post to Slack; anything
//! else can be plugged in by implementing the trait and registering a
//! constructor with the [`NotifierRegistry`].

mod file;
mod registry;
mod slack;
mod stdout;
mod writer;

pub use file::{FileNotifier, FILE};
pub use registry::{NotifierCreator, NotifierRegistry};
pub use slack::{SlackConfig, SlackNotifier, SLACK};
pub use stdout::{StdoutNotifier, STDOUT};
pub use writer::{render_text, WriterNotifier};

use std::fmt::Debug;

use async_trait::async_trait;
use statuswatch_types::{Component, Incident, ScheduledMaintenance, Status};

use crate::error::NotifyError;

/// What changed between two snapshots.
///
/// Only the parts that changed are populated. The monitor never dispatches an
/// empty message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    /// The new overall status, if it changed.
    pub changed_status: Option<Status>,

    /// New components and components whose `updated_at` moved.
    pub changed_components: Vec<Component>,

    /// New incidents and incidents whose `updated_at` moved.
    pub changed_incidents: Vec<Incident>,

    /// New maintenances and maintenances whose `updated_at` moved.
    pub changed_scheduled_maintenances: Vec<ScheduledMaintenance>,
}

impl Message {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed_status.is_none()
            && self.changed_components.is_empty()
            && self.changed_incidents.is_empty()
            && self.changed_scheduled_maintenances.is_empty()
    }
}

/// A backend that relays change messages to another system.
///
/// Implementations must tolerate concurrent `notify` calls from the monitor's
/// dispatch tasks and should bound their own network calls with a timeout: the
/// monitor never cancels a delivery in flight.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Name the notifier is registered under, e.g. `stdout`.
    fn name(&self) -> &str;

    /// Check the backend is reachable and usable before the first delivery.
    /// A failure here stops startup.
    async fn connect(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    /// Deliver a message.
    async fn notify(&self, message: &Message) -> Result<(), NotifyError>;

    /// Release resources. Called once at shutdown, whether or not any message
    /// was ever delivered.
    fn cleanup(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}
