//! Layered runtime settings.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML/YAML/JSON file (`--config`)
//! 3. `STATUSWATCH__<SECTION>__<KEY>` environment variables
//! 4. command line flags, applied by the binary as overrides
//!
//! ```toml
//! [monitor]
//! poll_interval_secs = 30
//! notify_on_first_run = true
//!
//! [slack]
//! channel = "#status"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use statuswatch_client::{ClientError, StatusPageClient, GITHUB_STATUS_URL};

use crate::error::Result;
use crate::notifier::SlackConfig;

/// Prefix of settings environment variables.
pub const ENV_PREFIX: &str = "STATUSWATCH";

/// All runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub monitor: MonitorSettings,
    pub client: ClientSettings,
    pub file: FileSettings,
    pub slack: SlackConfig,
}

/// Monitor loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Seconds between polls.
    pub poll_interval_secs: u64,
    /// Upper bound on a single fetch, retries included.
    pub fetch_timeout_secs: u64,
    /// Report the first observation instead of silently adopting it.
    pub notify_on_first_run: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            fetch_timeout_secs: 10,
            notify_on_first_run: false,
        }
    }
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Status page client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_wait_min_secs: u64,
    pub retry_wait_max_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: GITHUB_STATUS_URL.to_string(),
            timeout_secs: 5,
            max_retries: 5,
            retry_wait_min_secs: 1,
            retry_wait_max_secs: 5,
        }
    }
}

impl ClientSettings {
    /// Build a client from these settings.
    pub fn build_client(&self) -> std::result::Result<StatusPageClient, ClientError> {
        StatusPageClient::builder()
            .endpoint(&self.endpoint)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .retry_wait(
                Duration::from_secs(self.retry_wait_min_secs),
                Duration::from_secs(self.retry_wait_max_secs),
            )
            .build()
    }
}

/// File notifier settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// File to append changes to.
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Defaults, the optional file and the process environment, ready for
    /// command line overrides.
    pub fn builder(config_file: Option<&Path>) -> ConfigBuilder<DefaultState> {
        layered(config_file, environment())
    }

    /// Deserialize and validate a built configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings without command line overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::from_config(Self::builder(config_file).build()?)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "monitor.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.monitor.fetch_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "monitor.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.client.retry_wait_min_secs > self.client.retry_wait_max_secs {
            return Err(ConfigError::Message(
                "client.retry_wait_min_secs must not exceed client.retry_wait_max_secs".to_string(),
            ));
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn layered(config_file: Option<&Path>, env: Environment) -> ConfigBuilder<DefaultState> {
    let mut builder = Config::builder();
    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder.add_source(env)
}
