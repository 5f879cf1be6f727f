//! Error types.
//!
//! Per-tick failures ([`SourceError`], [`NotifyError`]) are logged and never
//! stop the monitor. Startup failures (bad configuration, unknown or duplicate
//! notifiers) surface as [`Error`] and abort the process.

use std::fmt;
use std::io;
use std::time::Duration;

use statuswatch_client::ClientError;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while fetching a snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The status page client failed (after its own retries).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading a snapshot from disk failed.
    #[error("Read error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot document could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The fetch did not finish within the monitor's fetch timeout.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The producer side of a channel source went away.
    #[error("snapshot source closed")]
    Closed,
}

/// Errors raised by a single notifier.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Writing the rendered message failed.
    #[error("error while writing {what}: {source}")]
    Write {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    /// The HTTP request to a remote service failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote service rejected the request.
    #[error("{service} API error: {reason}")]
    Api {
        service: &'static str,
        reason: String,
    },

    /// The notifier panicked while handling a message.
    #[error("notifier panicked: {0}")]
    Panicked(String),

    /// Releasing the notifier's resources failed.
    #[error("error cleaning up: {0}")]
    Cleanup(#[source] io::Error),
}

/// Delivery failures collected from every notifier during one tick.
#[derive(Debug, Default)]
pub struct DeliveryErrors(pub Vec<(String, NotifyError)>);

impl DeliveryErrors {
    /// Whether no notifier failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed notifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the notifiers that failed.
    pub fn notifiers(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Display for DeliveryErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, err)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "notifier {}: {}", name, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for DeliveryErrors {}

/// Top level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A tick could not fetch a snapshot.
    #[error("error getting summary: {0}")]
    Fetch(#[from] SourceError),

    /// A notifier with the same name is already registered.
    #[error("duplicate notifier {0}")]
    DuplicateNotifier(String),

    /// No notifier is registered under the requested name.
    #[error("no notifier named {0}")]
    UnknownNotifier(String),

    /// A notifier could not be constructed from the bound configuration.
    #[error("error creating notifier {name}: {reason}")]
    NotifierConfig { name: String, reason: String },

    /// One or more notifiers failed to deliver this tick's message.
    #[error(transparent)]
    Delivery(#[from] DeliveryErrors),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The status page client could not be built.
    #[error("error creating client: {0}")]
    Client(#[from] ClientError),

    /// `LOG_LEVEL` is not a valid filter directive.
    #[error("invalid log level: {0}")]
    LogLevel(#[from] tracing_subscriber::filter::ParseError),

    #[error("error initializing logging: {0}")]
    Logging(String),

    #[error("error encoding as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("error encoding as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a notifier configuration error.
    pub fn notifier_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::NotifierConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_errors_are_joined() {
        let errors = DeliveryErrors(vec![
            (
                "slack".to_string(),
                NotifyError::Api {
                    service: "Slack",
                    reason: "channel_not_found".to_string(),
                },
            ),
            ("file".to_string(), NotifyError::Panicked("boom".to_string())),
        ]);

        assert_eq!(
            errors.to_string(),
            "notifier slack: Slack API error: channel_not_found; notifier file: notifier panicked: boom"
        );
        assert_eq!(errors.notifiers().collect::<Vec<_>>(), vec!["slack", "file"]);
    }

    #[test]
    fn test_fetch_error_message() {
        let err = Error::from(SourceError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.to_string(), "error getting summary: fetch timed out after 10s");
    }
}
