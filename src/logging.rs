//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so the `stdout` notifier's output stays clean.

use std::io;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable holding the filter directive, e.g. `debug` or
/// `statuswatch=debug,reqwest=warn`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

const DEFAULT_DIRECTIVE: &str = "info";

/// Build a filter from a directive, `info` when none is given.
pub fn filter(directive: Option<&str>) -> Result<EnvFilter, ParseError> {
    match directive.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_new(DEFAULT_DIRECTIVE),
    }
}

/// Install the global subscriber, reading the level from `LOG_LEVEL`.
///
/// Fails on an unparsable level or if a subscriber is already installed.
pub fn init(json: bool) -> Result<()> {
    let directive = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = filter(directive.as_deref())?;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
