//! Components, incidents and scheduled maintenances.

use crate::{ComponentStatus, Indicator, IncidentStatus, MaintenanceStatus, Timestamp};

/// A component of the status page along with its current status.
///
/// Statuspage does not guarantee a stable component ID across summaries, so
/// consumers key components by [`Component::name`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Component {
    /// Display name. Doubles as the component's identity.
    pub name: String,

    /// Free form description, if the page provides one.
    pub description: Option<String>,

    /// Current status.
    pub status: ComponentStatus,

    /// When the component was created.
    pub created_at: Option<Timestamp>,

    /// When the component was last updated.
    pub updated_at: Option<Timestamp>,

    /// Position on the page.
    pub position: i32,

    /// Whether this component is a group of other components.
    pub group: bool,

    /// ID of the group this component belongs to.
    pub group_id: Option<String>,

    /// Whether the component is only shown while degraded.
    pub only_show_if_degraded: bool,

    /// Whether the component is showcased.
    pub showcase: bool,

    /// ID of the owning page.
    pub page_id: String,

    /// Start date as published (a plain date, not a timestamp).
    pub start_date: Option<String>,
}

impl Component {
    /// Create a component with the fields change detection cares about.
    pub fn new(name: impl Into<String>, status: ComponentStatus, updated_at: Timestamp) -> Self {
        Self {
            name: name.into(),
            status,
            updated_at: Some(updated_at),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An update posted to an incident or a scheduled maintenance.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IncidentUpdate {
    pub id: String,

    /// Plain text body of the update.
    pub body: String,

    pub incident_id: String,

    /// Status of the parent at the time of the update.
    pub status: IncidentStatus,

    pub created_at: Option<Timestamp>,

    pub display_at: Option<Timestamp>,

    pub updated_at: Option<Timestamp>,
}

impl IncidentUpdate {
    /// Create an update with a body and a timestamp.
    pub fn new(body: impl Into<String>, updated_at: Timestamp) -> Self {
        Self {
            body: body.into(),
            updated_at: Some(updated_at),
            ..Default::default()
        }
    }
}

/// An incident on the status page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Incident {
    /// Identifier of the incident.
    pub id: String,

    pub name: String,

    pub status: IncidentStatus,

    pub impact: Indicator,

    /// Updates, newest first.
    pub incident_updates: Vec<IncidentUpdate>,

    pub created_at: Option<Timestamp>,

    pub monitoring_at: Option<Timestamp>,

    pub resolved_at: Option<Timestamp>,

    pub updated_at: Option<Timestamp>,

    pub page_id: String,

    /// Short link to the incident page.
    pub shortlink: String,
}

impl Incident {
    /// Create an incident with the fields change detection cares about.
    pub fn new(id: impl Into<String>, name: impl Into<String>, updated_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            updated_at: Some(updated_at),
            ..Default::default()
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the impact.
    pub fn with_impact(mut self, impact: Indicator) -> Self {
        self.impact = impact;
        self
    }

    /// Prepend an update, keeping the newest-first order.
    pub fn with_update(mut self, update: IncidentUpdate) -> Self {
        self.incident_updates.insert(0, update);
        self
    }

    /// The most recent update, if any.
    pub fn latest_update(&self) -> Option<&IncidentUpdate> {
        self.incident_updates.first()
    }
}

/// A scheduled maintenance on the status page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduledMaintenance {
    /// Identifier of the scheduled maintenance.
    pub id: String,

    pub name: String,

    pub status: MaintenanceStatus,

    /// Expected impact.
    pub impact: Indicator,

    /// Updates, newest first.
    pub incident_updates: Vec<IncidentUpdate>,

    pub created_at: Option<Timestamp>,

    pub monitoring_at: Option<Timestamp>,

    pub resolved_at: Option<Timestamp>,

    /// Start of the maintenance window.
    pub scheduled_for: Option<Timestamp>,

    /// End of the maintenance window.
    pub scheduled_until: Option<Timestamp>,

    pub updated_at: Option<Timestamp>,

    pub page_id: String,

    pub shortlink: String,
}

impl ScheduledMaintenance {
    /// Create a maintenance with the fields change detection cares about.
    pub fn new(id: impl Into<String>, name: impl Into<String>, updated_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            updated_at: Some(updated_at),
            ..Default::default()
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: MaintenanceStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the expected impact.
    pub fn with_impact(mut self, impact: Indicator) -> Self {
        self.impact = impact;
        self
    }

    /// Set the maintenance window.
    pub fn with_window(mut self, from: Timestamp, until: Timestamp) -> Self {
        self.scheduled_for = Some(from);
        self.scheduled_until = Some(until);
        self
    }

    /// Prepend an update, keeping the newest-first order.
    pub fn with_update(mut self, update: IncidentUpdate) -> Self {
        self.incident_updates.insert(0, update);
        self
    }

    /// The most recent update, if any.
    pub fn latest_update(&self) -> Option<&IncidentUpdate> {
        self.incident_updates.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_with_update_keeps_newest_first() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();

        let incident = Incident::new("abc", "Degraded Actions", t2)
            .with_update(IncidentUpdate::new("Investigating", t1))
            .with_update(IncidentUpdate::new("Fix deployed", t2));

        assert_eq!(incident.latest_update().unwrap().body, "Fix deployed");
        assert_eq!(incident.incident_updates.len(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_incident() {
        let json = r#"{
            "id": "x1y2",
            "name": "Incident with Pages",
            "status": "investigating",
            "impact": "minor",
            "created_at": "2024-05-01T10:00:00.000Z",
            "updated_at": "2024-05-01T10:05:00.000Z",
            "resolved_at": null,
            "shortlink": "https://stspg.io/x1y2",
            "incident_updates": [
                {
                    "id": "u1",
                    "status": "investigating",
                    "body": "We are investigating reports of degraded performance for Pages",
                    "incident_id": "x1y2",
                    "created_at": "2024-05-01T10:05:00.000Z",
                    "updated_at": "2024-05-01T10:05:00.000Z"
                }
            ]
        }"#;

        let incident: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.id, "x1y2");
        assert_eq!(incident.status, IncidentStatus::Investigating);
        assert_eq!(incident.impact, Indicator::Minor);
        assert!(incident.resolved_at.is_none());
        assert_eq!(
            incident.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap())
        );
        assert!(incident.latest_update().unwrap().body.contains("Pages"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_component_with_missing_fields() {
        let json = r#"{"name": "Webhooks", "status": "major_outage"}"#;

        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(component.name, "Webhooks");
        assert_eq!(component.status, ComponentStatus::MajorOutage);
        assert!(component.updated_at.is_none());
    }
}
