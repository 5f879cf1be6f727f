//! # statuswatch
//!
//! Polls a Statuspage-hosted status page (GitHub's by default) and relays
//! what changed to stdout, a file or Slack.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌─────────┐   ┌────────┐   ┌───────────────────┐
//! │ SnapshotSource │──▶│ Monitor │──▶│ detect │──▶│ Notifier (×N)     │
//! │ statuspage,    │   │ (ticks) │   │ (pure) │   │ stdout/file/slack │
//! │ file, channel  │   └─────────┘   └────────┘   └───────────────────┘
//! └────────────────┘
//! ```
//!
//! - **[`source`]**: where snapshots come from ([`SnapshotSource`])
//! - **[`detect`]**: pure comparison of two snapshots into a [`Detection`]
//! - **[`monitor`]**: the polling loop, notifier set and dispatch
//! - **[`notifier`]**: the [`Notifier`] trait, built-in backends and the
//!   [`NotifierRegistry`] the CLI resolves `--notifiers` against
//! - **[`ticker`]**: timers driving the loop, including a manual one for tests
//! - **[`render`]**: YAML, JSON and table output for the inspection commands
//!
//! ## Usage
//!
//! ```bash
//! # Print changes to stdout every minute
//! statuswatch monitor
//!
//! # Post to Slack and append to a file, reporting the current state first
//! statuswatch monitor -n slack -n file -f \
//!     --slack-channel '#status' --fn-filepath /var/log/github-status.log
//!
//! # One-off inspection
//! statuswatch incidents --all --format yaml
//! ```
//!
//! ## As a library
//!
//! ```
//! use std::sync::Arc;
//! use statuswatch::{ChannelSource, Monitor, StdoutNotifier};
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let monitor = Monitor::builder(source).notify_on_first_run(true).build();
//! monitor.register_notifier(Arc::new(StdoutNotifier::new())).unwrap();
//! ```

pub mod detect;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notifier;
pub mod render;
pub mod settings;
pub mod source;
pub mod ticker;

pub use detect::{detect_changes, Detection, PLACEHOLDER_COMPONENT};
pub use error::{DeliveryErrors, Error, NotifyError, Result, SourceError};
pub use monitor::{Monitor, MonitorBuilder, TickOutcome};
pub use notifier::{
    FileNotifier, Message, Notifier, NotifierRegistry, SlackConfig, SlackNotifier, StdoutNotifier,
    WriterNotifier,
};
pub use render::Format;
pub use settings::Settings;
pub use source::{ChannelSource, FileSource, SnapshotSource, StatusPageSource};
pub use ticker::{IntervalTicker, ManualTicker, TickHandle, Ticker};

pub use statuswatch_client::{ClientError, StatusPageClient};
pub use statuswatch_types::Snapshot;
