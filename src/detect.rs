//! Change detection between two successive snapshots.
//!
//! Everything here is pure: no I/O, no clocks, no shared state. The monitor
//! loop feeds in the last known snapshot and the one it just fetched, and gets
//! back a [`Detection`] telling it what (if anything) to send and which
//! snapshot to keep.
//!
//! Only timestamps decide whether a resource changed. A component whose
//! `updated_at` is unchanged is not reported even if its other fields differ.

use std::collections::HashMap;

use statuswatch_types::{Component, Incident, ScheduledMaintenance, Snapshot, Status, Timestamp};

use crate::notifier::Message;

/// Faux component injected by githubstatus.com. It never represents a real
/// service and is never reported.
pub const PLACEHOLDER_COMPONENT: &str = "Visit www.githubstatus.com for more information";

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// First observation and first-run notifications are disabled. The current
    /// snapshot becomes the last known one.
    FirstRun,

    /// The page timestamp did not move. The previous snapshot stays the last
    /// known one and the current one is discarded.
    Unchanged,

    /// The page moved but nothing we track changed. The current snapshot
    /// becomes the last known one.
    NoChanges,

    /// Something changed. The current snapshot becomes the last known one.
    Changed(Message),
}

impl Detection {
    /// Whether the snapshot that was just fetched replaces the last known one.
    pub fn adopts_current(&self) -> bool {
        !matches!(self, Detection::Unchanged)
    }

    /// The message to dispatch, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Detection::Changed(message) => Some(message),
            _ => None,
        }
    }

    /// Consume the detection and return the message to dispatch, if any.
    pub fn into_message(self) -> Option<Message> {
        match self {
            Detection::Changed(message) => Some(message),
            _ => None,
        }
    }
}

/// Compare `previous` against `current`.
///
/// `notify_on_first_run` controls whether the very first observation (when
/// `previous` is the zero snapshot) is compared against the empty state and
/// reported, or silently adopted.
pub fn detect_changes(previous: &Snapshot, current: &Snapshot, notify_on_first_run: bool) -> Detection {
    if previous.is_bootstrap() && !notify_on_first_run {
        return Detection::FirstRun;
    }

    if current.updated_at() == previous.updated_at() {
        return Detection::Unchanged;
    }

    let message = Message {
        changed_status: changed_status(&previous.status, &current.status),
        changed_components: find_changed_components(&previous.components, &current.components),
        changed_incidents: find_changed_incidents(&previous.incidents, &current.incidents),
        changed_scheduled_maintenances: find_changed_scheduled_maintenances(
            &previous.scheduled_maintenances,
            &current.scheduled_maintenances,
        ),
    };

    if message.is_empty() {
        Detection::NoChanges
    } else {
        Detection::Changed(message)
    }
}

/// The whole current status if either its indicator or description moved.
pub fn changed_status(previous: &Status, current: &Status) -> Option<Status> {
    if previous.description != current.description || previous.indicator != current.indicator {
        Some(current.clone())
    } else {
        None
    }
}

/// Components that are new or whose `updated_at` moved, keyed by name. The
/// [`PLACEHOLDER_COMPONENT`] is never reported.
pub fn find_changed_components(previous: &[Component], current: &[Component]) -> Vec<Component> {
    let mut changed = find_changed_resources(previous, current, |c| c.name.as_str(), |c| c.updated_at);
    changed.retain(|c| c.name != PLACEHOLDER_COMPONENT);
    changed
}

/// Incidents that are new or whose `updated_at` moved, keyed by ID.
pub fn find_changed_incidents(previous: &[Incident], current: &[Incident]) -> Vec<Incident> {
    find_changed_resources(previous, current, |i| i.id.as_str(), |i| i.updated_at)
}

/// Maintenances that are new or whose `updated_at` moved, keyed by ID.
pub fn find_changed_scheduled_maintenances(
    previous: &[ScheduledMaintenance],
    current: &[ScheduledMaintenance],
) -> Vec<ScheduledMaintenance> {
    find_changed_resources(previous, current, |m| m.id.as_str(), |m| m.updated_at)
}

/// Resources of `current` that are absent from `previous` or whose updated-at
/// timestamp differs, in `current` order.
///
/// Resources that disappeared are ignored: upstream drops them once they are
/// resolved or cleaned up, which is not something to report.
pub fn find_changed_resources<T, K, U>(previous: &[T], current: &[T], key: K, updated_at: U) -> Vec<T>
where
    T: Clone,
    K: Fn(&T) -> &str,
    U: Fn(&T) -> Option<Timestamp>,
{
    let last: HashMap<&str, &T> = previous.iter().map(|r| (key(r), r)).collect();

    let mut changed = Vec::new();
    for resource in current {
        let id = key(resource);
        let is_changed = match last.get(id) {
            None => true,
            Some(&old) => updated_at(old) != updated_at(resource),
        };
        if is_changed {
            changed.push(resource.clone());
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use statuswatch_types::{ComponentStatus, Indicator, IncidentStatus, IncidentUpdate};

    fn t(minute: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn base(at: Timestamp) -> Snapshot {
        Snapshot::builder()
            .updated_at(at)
            .status(Indicator::None, "All Systems Operational")
            .build()
    }

    #[test]
    fn test_first_run_is_silent_by_default() {
        let current = Snapshot::builder()
            .updated_at(t(0))
            .status(Indicator::Major, "outage")
            .build();

        let detection = detect_changes(&Snapshot::default(), &current, false);
        assert_eq!(detection, Detection::FirstRun);
        assert!(detection.adopts_current());
        assert!(detection.message().is_none());
    }

    #[test]
    fn test_first_run_reports_status_when_enabled() {
        let current = Snapshot::builder()
            .updated_at(t(0))
            .status(Indicator::Major, "outage")
            .build();

        let detection = detect_changes(&Snapshot::default(), &current, true);
        assert_eq!(
            detection,
            Detection::Changed(Message {
                changed_status: Some(Status::new(Indicator::Major, "outage")),
                ..Default::default()
            })
        );
        assert!(detection.adopts_current());
    }

    #[test]
    fn test_equal_page_timestamp_is_unchanged_whatever_else_differs() {
        let previous = base(t(0));
        let current = Snapshot::builder()
            .updated_at(t(0))
            .status(Indicator::Critical, "Major Service Outage")
            .component(Component::new("Actions", ComponentStatus::MajorOutage, t(5)))
            .incident(Incident::new("i1", "Actions down", t(5)))
            .build();

        let detection = detect_changes(&previous, &current, false);
        assert_eq!(detection, Detection::Unchanged);
        assert!(!detection.adopts_current());
    }

    #[test]
    fn test_unchanged_applies_even_with_first_run_notifications() {
        let detection = detect_changes(&Snapshot::default(), &Snapshot::default(), true);
        assert_eq!(detection, Detection::Unchanged);
    }

    #[test]
    fn test_page_moved_without_tracked_changes() {
        let previous = Snapshot::builder()
            .updated_at(t(0))
            .status(Indicator::None, "All Systems Operational")
            .component(Component::new("API Requests", ComponentStatus::Operational, t(0)))
            .build();
        let mut current = previous.clone();
        current.page.updated_at = Some(t(1));

        let detection = detect_changes(&previous, &current, false);
        assert_eq!(detection, Detection::NoChanges);
        assert!(detection.adopts_current());
    }

    #[test]
    fn test_status_change_reports_whole_current_status() {
        let previous = base(t(0));
        let current = Snapshot::builder()
            .updated_at(t(1))
            .status(Indicator::None, "Partial outage resolved")
            .build();

        let message = detect_changes(&previous, &current, false).into_message().unwrap();
        assert_eq!(
            message.changed_status,
            Some(Status::new(Indicator::None, "Partial outage resolved"))
        );
        assert!(message.changed_components.is_empty());
    }

    #[test]
    fn test_updated_and_new_components_in_current_order() {
        let previous = Snapshot::builder()
            .updated_at(t(0))
            .component(Component::new("A", ComponentStatus::Operational, t(1)))
            .build();
        let a = Component::new("A", ComponentStatus::PartialOutage, t(2));
        let b = Component::new("B", ComponentStatus::Operational, t(2));
        let current = Snapshot::builder()
            .updated_at(t(2))
            .component(a.clone())
            .component(b.clone())
            .build();

        let message = detect_changes(&previous, &current, false).into_message().unwrap();
        assert_eq!(message.changed_components, vec![a, b]);
        assert!(message.changed_status.is_none());
    }

    #[test]
    fn test_same_updated_at_is_not_a_change_even_if_fields_differ() {
        let previous = vec![Component::new("Pages", ComponentStatus::Operational, t(0))];
        let current = vec![Component::new("Pages", ComponentStatus::MajorOutage, t(0))
            .with_description("now with a description")];

        assert!(find_changed_components(&previous, &current).is_empty());
    }

    #[test]
    fn test_vanished_resources_are_ignored() {
        let previous = vec![
            Incident::new("gone", "Resolved earlier", t(0)),
            Incident::new("kept", "Ongoing", t(0)),
        ];
        let updated = Incident::new("kept", "Ongoing", t(3)).with_status(IncidentStatus::Monitoring);
        let current = vec![updated.clone()];

        assert_eq!(find_changed_incidents(&previous, &current), vec![updated]);
    }

    #[test]
    fn test_new_resources_are_always_changed() {
        let maintenance = ScheduledMaintenance::new("m1", "Database upgrade", t(0));
        let incident = Incident::new("i1", "Degraded Codespaces", t(0))
            .with_update(IncidentUpdate::new("Investigating", t(0)));
        let component = Component::new("Codespaces", ComponentStatus::DegradedPerformance, t(0));

        assert_eq!(
            find_changed_scheduled_maintenances(&[], std::slice::from_ref(&maintenance)),
            vec![maintenance]
        );
        assert_eq!(find_changed_incidents(&[], std::slice::from_ref(&incident)), vec![incident]);
        assert_eq!(
            find_changed_components(&[], std::slice::from_ref(&component)),
            vec![component]
        );
    }

    #[test]
    fn test_placeholder_component_is_never_reported() {
        let previous = vec![Component::new(PLACEHOLDER_COMPONENT, ComponentStatus::Operational, t(0))];
        let current = vec![
            Component::new(PLACEHOLDER_COMPONENT, ComponentStatus::Operational, t(9)),
            Component::new("Copilot", ComponentStatus::Operational, t(9)),
        ];

        let changed = find_changed_components(&previous, &current);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].name, "Copilot");

        // Not even when it shows up for the first time.
        let changed = find_changed_components(&[], &current[..1]);
        assert!(changed.is_empty());

        // The filter is specific to components.
        let incident = Incident::new("i9", PLACEHOLDER_COMPONENT, t(9));
        let changed = find_changed_resources(&[], &[incident], |i| i.name.as_str(), |i| i.updated_at);
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn test_renamed_component_looks_like_a_new_one() {
        // Components are keyed by display name, so a rename reads as a new
        // component and the old name silently disappears.
        let previous = vec![Component::new("Git Operations", ComponentStatus::Operational, t(0))];
        let current = vec![Component::new("Git", ComponentStatus::Operational, t(0))];

        let changed = find_changed_components(&previous, &current);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].name, "Git");
    }

    #[test]
    fn test_every_resource_kind_is_reported_together() {
        let previous = base(t(0));
        let current = Snapshot::builder()
            .updated_at(t(1))
            .status(Indicator::Minor, "Minor Service Outage")
            .component(Component::new("Issues", ComponentStatus::DegradedPerformance, t(1)))
            .incident(Incident::new("i1", "Slow issues", t(1)))
            .scheduled_maintenance(ScheduledMaintenance::new("m1", "Search reindex", t(1)))
            .build();

        let message = detect_changes(&previous, &current, false).into_message().unwrap();
        assert!(message.changed_status.is_some());
        assert_eq!(message.changed_components.len(), 1);
        assert_eq!(message.changed_incidents.len(), 1);
        assert_eq!(message.changed_scheduled_maintenances.len(), 1);
    }
}
