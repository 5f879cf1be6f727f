use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use config::builder::DefaultState;
use config::ConfigBuilder;
use tokio::sync::watch;
use tracing::{error, info, warn};

use statuswatch::render::{self, Format};
use statuswatch::{logging, Error, Monitor, NotifierRegistry, Settings, StatusPageSource};

#[derive(Parser, Debug)]
#[command(name = "statuswatch", version)]
#[command(about = "Watch a status page and relay changes to stdout, files or Slack")]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "STATUSWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Status page base URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the status page and notify about changes until interrupted
    Monitor(MonitorArgs),

    /// Show the full summary
    Summary(FormatArgs),

    /// Show the overall status
    Status(FormatArgs),

    /// Show every component
    Components(FormatArgs),

    /// Show unresolved incidents
    Incidents {
        #[command(flatten)]
        format: FormatArgs,

        /// Include resolved incidents
        #[arg(long)]
        all: bool,
    },

    /// Show scheduled maintenances
    ScheduledMaintenances {
        #[command(flatten)]
        format: FormatArgs,

        /// Only maintenances that have not started
        #[arg(long, conflicts_with = "active")]
        upcoming: bool,

        /// Only maintenances in progress
        #[arg(long)]
        active: bool,
    },
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// Notifiers to send changes to: stdout, file, slack
    #[arg(short = 'n', long = "notifiers", value_delimiter = ',', default_value = "stdout")]
    notifiers: Vec<String>,

    /// Report the current state on the first poll
    #[arg(short = 'f', long)]
    notify_on_first_run: bool,

    /// Seconds between polls
    #[arg(long)]
    poll_interval: Option<u32>,

    /// File the file notifier appends to
    #[arg(long = "fn-filepath", env = "FN_FILEPATH")]
    file_path: Option<PathBuf>,

    /// Slack bot OAuth token
    #[arg(long, env = "SLACK_OAUTH_TOKEN", hide_env_values = true)]
    slack_oauth_token: Option<String>,

    /// Slack channel ID or #name
    #[arg(long, env = "SLACK_CHANNEL")]
    slack_channel: Option<String>,

    /// Join the Slack channel before posting
    #[arg(long, env = "SLACK_JOIN_CHANNEL")]
    slack_join_channel: bool,
}

impl MonitorArgs {
    fn apply(&self, builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
        Ok(builder
            .set_override_option(
                "monitor.notify_on_first_run",
                self.notify_on_first_run.then_some(true),
            )?
            .set_override_option(
                "monitor.poll_interval_secs",
                self.poll_interval.map(i64::from),
            )?
            .set_override_option(
                "file.path",
                self.file_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("slack.token", self.slack_oauth_token.clone())?
            .set_override_option("slack.channel", self.slack_channel.clone())?
            .set_override_option("slack.join_channel", self.slack_join_channel.then_some(true))?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json)?;

    let mut builder = Settings::builder(cli.config.as_deref())
        .set_override_option("client.endpoint", cli.endpoint.clone())?;
    if let Command::Monitor(args) = &cli.command {
        builder = args.apply(builder)?;
    }
    let settings = Settings::from_config(builder.build()?)?;

    match cli.command {
        Command::Monitor(args) => run_monitor(&settings, &args.notifiers).await,
        command => inspect(&settings, command).await,
    }
}

async fn run_monitor(settings: &Settings, names: &[String]) -> Result<()> {
    let names: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        bail!("at least one notifier must be specified");
    }

    let registry = NotifierRegistry::builtin(settings)?;
    let client = settings.client.build_client()?;
    let monitor = Monitor::builder(StatusPageSource::new(client))
        .notify_on_first_run(settings.monitor.notify_on_first_run)
        .fetch_timeout(settings.monitor.fetch_timeout())
        .build();

    let notifiers = match registry.connect_all(&names).await {
        Err(Error::UnknownNotifier(name)) => bail!(
            "no notifier named {} (available: {})",
            name,
            registry.names().join(", ")
        ),
        other => other?,
    };
    for notifier in notifiers {
        if let Err(e) = monitor.register_notifier(notifier) {
            cleanup(&monitor);
            return Err(e.into());
        }
    }

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down");
        let _ = stop.send(true);
    });

    monitor.run(shutdown, settings.monitor.poll_interval()).await;

    cleanup(&monitor);
    Ok(())
}

fn cleanup(monitor: &Monitor) {
    for (name, err) in monitor.cleanup() {
        warn!(notifier = %name, error = %err, "Error cleaning up notifier");
    }
}

async fn inspect(settings: &Settings, command: Command) -> Result<()> {
    let client = settings.client.build_client()?;

    let output = match command {
        Command::Summary(args) => render::render(&client.summary().await?, args.format)?,
        Command::Status(args) => render::render(&client.status().await?, args.format)?,
        Command::Components(args) => render::render(&client.components().await?, args.format)?,
        Command::Incidents { format, all } => {
            let incidents = if all {
                client.all_incidents().await?
            } else {
                client.unresolved_incidents().await?
            };
            render::render(&incidents, format.format)?
        }
        Command::ScheduledMaintenances {
            format,
            upcoming,
            active,
        } => {
            let maintenances = if upcoming {
                client.upcoming_scheduled_maintenances().await?
            } else if active {
                client.active_scheduled_maintenances().await?
            } else {
                client.all_scheduled_maintenances().await?
            };
            render::render(&maintenances, format.format)?
        }
        Command::Monitor(_) => bail!("monitor is not an inspection command"),
    };

    print!("{}", output);
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
