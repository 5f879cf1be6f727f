//! Snapshot - a point-in-time view of a status page.

use crate::{Component, Incident, Indicator, ScheduledMaintenance, Status, Timestamp};

/// Metadata describing the status page itself.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Page {
    /// ID of the page.
    pub id: String,

    /// Name of the page, e.g. "GitHub".
    pub name: String,

    /// URL of the page.
    pub url: String,

    /// When anything on the page last changed.
    pub updated_at: Option<Timestamp>,
}

/// A point-in-time snapshot of a status page.
///
/// This is the top-level document served by the summary endpoint: page
/// metadata, the overall status, every component, the unresolved incidents and
/// the upcoming or in-progress scheduled maintenances.
///
/// `Snapshot::default()` is the zero snapshot: its page timestamp is unset,
/// which is how a monitor recognises that it has not observed the feed yet.
///
/// # Example
///
/// ```rust
/// use statuswatch_types::{Indicator, Snapshot};
/// use chrono::Utc;
///
/// let snapshot = Snapshot::builder()
///     .updated_at(Utc::now())
///     .status(Indicator::None, "All Systems Operational")
///     .build();
///
/// assert!(Snapshot::default().is_bootstrap());
/// assert!(!snapshot.is_bootstrap());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Snapshot {
    /// Page metadata.
    pub page: Page,

    /// Overall status.
    pub status: Status,

    /// All components.
    pub components: Vec<Component>,

    /// Unresolved incidents.
    pub incidents: Vec<Incident>,

    /// Upcoming and in-progress maintenances.
    pub scheduled_maintenances: Vec<ScheduledMaintenance>,
}

impl Snapshot {
    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// When the page last changed, if known.
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.page.updated_at
    }

    /// Whether this is the zero snapshot (page timestamp unset).
    pub fn is_bootstrap(&self) -> bool {
        self.page.updated_at.is_none()
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Look up an incident by ID.
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page metadata, keeping any timestamp already set.
    pub fn page(mut self, id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.snapshot.page.id = id.into();
        self.snapshot.page.name = name.into();
        self.snapshot.page.url = url.into();
        self
    }

    /// Set the page's updated-at timestamp.
    pub fn updated_at(mut self, at: Timestamp) -> Self {
        self.snapshot.page.updated_at = Some(at);
        self
    }

    /// Set the overall status.
    pub fn status(mut self, indicator: Indicator, description: impl Into<String>) -> Self {
        self.snapshot.status = Status::new(indicator, description);
        self
    }

    /// Add a component.
    pub fn component(mut self, component: Component) -> Self {
        self.snapshot.components.push(component);
        self
    }

    /// Add an incident.
    pub fn incident(mut self, incident: Incident) -> Self {
        self.snapshot.incidents.push(incident);
        self
    }

    /// Add a scheduled maintenance.
    pub fn scheduled_maintenance(mut self, maintenance: ScheduledMaintenance) -> Self {
        self.snapshot.scheduled_maintenances.push(maintenance);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_snapshot_builder() {
        let at = Utc.with_ymd_and_hms(2024, 2, 2, 8, 30, 0).unwrap();
        let snapshot = Snapshot::builder()
            .page("kctbh9vrtdwd", "GitHub", "https://www.githubstatus.com")
            .updated_at(at)
            .status(Indicator::Major, "Partial System Outage")
            .component(Component::new("Actions", ComponentStatus::MajorOutage, at))
            .incident(Incident::new("inc1", "Actions outage", at))
            .build();

        assert_eq!(snapshot.updated_at(), Some(at));
        assert_eq!(snapshot.page.name, "GitHub");
        assert_eq!(snapshot.status.indicator, Indicator::Major);
        assert_eq!(
            snapshot.component("Actions").unwrap().status,
            ComponentStatus::MajorOutage
        );
        assert!(snapshot.incident("inc1").is_some());
        assert!(snapshot.incident("missing").is_none());
    }

    #[test]
    fn test_default_is_bootstrap() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_bootstrap());
        assert!(snapshot.components.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_summary() {
        let json = r#"{
            "page": {
                "id": "kctbh9vrtdwd",
                "name": "GitHub",
                "url": "https://www.githubstatus.com",
                "time_zone": "Etc/UTC",
                "updated_at": "2024-06-11T16:12:48.541Z"
            },
            "components": [
                {
                    "id": "8l4ygp009s5s",
                    "name": "Git Operations",
                    "status": "operational",
                    "created_at": "2017-01-31T20:05:05.370Z",
                    "updated_at": "2024-06-10T09:21:32.474Z",
                    "position": 1,
                    "description": "Performance of git clones, pulls, pushes, and associated operations",
                    "showcase": false,
                    "start_date": null,
                    "group_id": null,
                    "page_id": "kctbh9vrtdwd",
                    "group": false,
                    "only_show_if_degraded": false
                }
            ],
            "incidents": [],
            "scheduled_maintenances": [],
            "status": {
                "indicator": "none",
                "description": "All Systems Operational"
            }
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(!snapshot.is_bootstrap());
        assert_eq!(snapshot.status.indicator, Indicator::None);
        assert_eq!(snapshot.components.len(), 1);
        assert_eq!(snapshot.components[0].position, 1);
        assert!(snapshot.components[0].start_date.is_none());
    }
}
