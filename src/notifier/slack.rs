//! Slack notification channel.
//!
//! Posts Block Kit messages with `chat.postMessage`. A channel given as
//! `#name` is looked up through `conversations.list` when the notifier
//! connects; a raw channel ID is used as is.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use statuswatch_types::{
    ComponentStatus, Incident, IncidentStatus, Indicator, MaintenanceStatus, ScheduledMaintenance,
};

use super::{render_text, Message, Notifier};
use crate::error::{Error, NotifyError, Result};

/// Registry name of the Slack notifier.
pub const SLACK: &str = "slack";

/// Default Slack Web API base URL.
pub const SLACK_API_URL: &str = "https://slack.com/api";

const GOOD_EMOJI: &str = ":white_check_mark:";
const BAD_EMOJI: &str = ":warning:";
const INFO_EMOJI: &str = ":information_source:";

const SERVICE: &str = "Slack";

/// Slack channel configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot OAuth token.
    pub token: String,
    /// Channel ID, or `#name` to look it up.
    pub channel: String,
    /// Join the channel before the first post.
    pub join_channel: bool,
    /// Web API base URL.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: String::new(),
            join_channel: false,
            api_url: SLACK_API_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .field("join_channel", &self.join_channel)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Posts change messages to a Slack channel.
#[derive(Debug)]
pub struct SlackNotifier {
    config: SlackConfig,
    client: Client,
    channel_id: OnceCell<String>,
}

impl SlackNotifier {
    /// Validate the configuration and build the HTTP client.
    ///
    /// No request is made here. Channel lookup and joining happen in
    /// [`Notifier::connect`], or on the first delivery if it was never called.
    pub fn new(config: SlackConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(Error::notifier_config(
                SLACK,
                "OAuth token must be supplied for the Slack notifier",
            ));
        }
        if config.channel.is_empty() || config.channel == "#" {
            return Err(Error::notifier_config(
                SLACK,
                "channel must be supplied for the Slack notifier",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::notifier_config(SLACK, e.to_string()))?;

        Ok(Self {
            config,
            client,
            channel_id: OnceCell::new(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), method)
    }

    /// The resolved channel ID, looking it up (and joining) on first use.
    /// A failed lookup is retried next time.
    async fn channel_id(&self) -> Result<&str, NotifyError> {
        let id = self
            .channel_id
            .get_or_try_init(|| async {
                let id = match self.config.channel.strip_prefix('#') {
                    Some(name) => self.find_channel(name).await?,
                    None => self.config.channel.clone(),
                };

                if self.config.join_channel {
                    self.join(&id).await?;
                }

                Ok::<_, NotifyError>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// Page through `conversations.list` until a channel called `name` shows up.
    async fn find_channel(&self, name: &str) -> Result<String, NotifyError> {
        let mut cursor: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(self.url("conversations.list"))
                .bearer_auth(&self.config.token)
                .query(&[("exclude_archived", "true"), ("limit", "200")]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            let page: ConversationsPage = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            check(page.ok, page.error)?;

            if let Some(channel) = page.channels.into_iter().find(|c| c.name == name) {
                debug!(channel = %name, id = %channel.id, "Resolved Slack channel");
                return Ok(channel.id);
            }

            match page.response_metadata.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => {
                    return Err(NotifyError::Api {
                        service: SERVICE,
                        reason: format!("unable to find channel #{}", name),
                    })
                }
            }
        }
    }

    async fn join(&self, channel_id: &str) -> Result<(), NotifyError> {
        let response: ApiStatus = self
            .client
            .post(self.url("conversations.join"))
            .bearer_auth(&self.config.token)
            .json(&json!({ "channel": channel_id }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(response.ok, response.error)?;

        info!(channel = %channel_id, "Joined Slack channel");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        SLACK
    }

    async fn connect(&self) -> Result<(), NotifyError> {
        let id = self.channel_id().await?;
        info!(channel = %self.config.channel, id = %id, "Slack notifier connected");
        Ok(())
    }

    async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
        let blocks = build_blocks(message);
        if blocks.is_empty() {
            debug!("Slack notifier found no changes");
            return Ok(());
        }

        let channel = self.channel_id().await?;
        let payload = json!({
            "channel": channel,
            "text": render_text(message),
            "blocks": blocks,
        });

        let response: ApiStatus = self
            .client
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(response.ok, response.error)?;

        debug!(blocks = blocks.len(), "Slack notified of changes");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConversationsPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Conversation>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct Conversation {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

fn check(ok: bool, error: Option<String>) -> Result<(), NotifyError> {
    if ok {
        Ok(())
    } else {
        Err(NotifyError::Api {
            service: SERVICE,
            reason: error.unwrap_or_else(|| "unknown error".to_string()),
        })
    }
}

/// Block Kit blocks for a message: a header per non-empty section followed by
/// one section block per item.
fn build_blocks(message: &Message) -> Vec<Value> {
    let mut blocks = Vec::new();

    if let Some(status) = &message.changed_status {
        let text = match &status.indicator {
            Indicator::None => format!("{} GitHub reports no outages", GOOD_EMOJI),
            indicator => format!("{} GitHub is reporting a *{}* outage", BAD_EMOJI, indicator),
        };
        blocks.push(header("Status"));
        blocks.push(section("status", "mrkdwn", text));
    }

    if !message.changed_components.is_empty() {
        blocks.push(header("Components"));
        for component in &message.changed_components {
            let text = match &component.status {
                ComponentStatus::Operational => {
                    format!("{} {} is operational", GOOD_EMOJI, component.name)
                }
                status => format!("{} {} is reporting {}", BAD_EMOJI, component.name, status),
            };
            blocks.push(section(&format!("component-{}", component.name), "mrkdwn", text));
        }
    }

    if !message.changed_incidents.is_empty() {
        blocks.push(header("Incidents"));
        for incident in &message.changed_incidents {
            blocks.push(section(
                &format!("incident-{}", incident.id),
                "mrkdwn",
                incident_text(incident),
            ));
        }
    }

    if !message.changed_scheduled_maintenances.is_empty() {
        blocks.push(header("Scheduled Maintenances"));
        for maintenance in &message.changed_scheduled_maintenances {
            blocks.push(section(
                &format!("scheduled-maintenance-{}", maintenance.id),
                "plain_text",
                maintenance_text(maintenance),
            ));
        }
    }

    blocks
}

fn incident_text(incident: &Incident) -> String {
    let name = &incident.name;
    let mut text = match &incident.status {
        IncidentStatus::Investigating => format!("{} \"{}\" is being investigated", BAD_EMOJI, name),
        IncidentStatus::Identified => {
            format!("{} The cause of \"{}\" has been identified", INFO_EMOJI, name)
        }
        IncidentStatus::Monitoring => format!("{} \"{}\" is being monitored", INFO_EMOJI, name),
        IncidentStatus::Resolved => format!("{} \"{}\" has been resolved", GOOD_EMOJI, name),
        IncidentStatus::Postmortem => format!("{} \"{}\" has a postmortem", GOOD_EMOJI, name),
        status => format!("{} \"{}\" has status {}", INFO_EMOJI, name, status),
    };

    text.push_str(&format!(" (impact {})", incident.impact));
    if let Some(update) = incident.latest_update() {
        text.push_str(&format!(": {}", update.body));
    }
    text
}

fn maintenance_text(maintenance: &ScheduledMaintenance) -> String {
    let name = &maintenance.name;
    let mut text = match &maintenance.status {
        MaintenanceStatus::Scheduled => format!("{} \"{}\" is scheduled", INFO_EMOJI, name),
        MaintenanceStatus::InProgress => format!("{} \"{}\" is in progress", INFO_EMOJI, name),
        MaintenanceStatus::Verifying => format!("{} \"{}\" is being verified", INFO_EMOJI, name),
        MaintenanceStatus::Completed => format!("{} \"{}\" is completed", INFO_EMOJI, name),
        status => format!("{} \"{}\" has status {}", INFO_EMOJI, name, status),
    };

    text.push_str(&format!(" (expected impact {})", maintenance.impact));
    text
}

fn header(text: &str) -> Value {
    json!({
        "type": "header",
        "text": { "type": "plain_text", "text": text },
    })
}

fn section(block_id: &str, text_type: &str, text: String) -> Value {
    json!({
        "type": "section",
        "block_id": block_id,
        "text": { "type": text_type, "text": text },
    })
}
