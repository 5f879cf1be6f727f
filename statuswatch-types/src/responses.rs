//! Envelopes returned by the narrower Statuspage endpoints.
//!
//! The summary endpoint returns a full [`Snapshot`](crate::Snapshot); every
//! other endpoint returns the page metadata plus one slice of it.

use crate::{Component, Incident, Page, ScheduledMaintenance, Status};

/// Response of the status endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusResponse {
    pub page: Page,
    pub status: Status,
}

/// Response of the components endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComponentsResponse {
    pub page: Page,
    pub components: Vec<Component>,
}

/// Response of the unresolved and all incidents endpoints.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IncidentsResponse {
    pub page: Page,
    pub incidents: Vec<Incident>,
}

/// Response of the upcoming, active and all scheduled maintenances endpoints.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduledMaintenancesResponse {
    pub page: Page,
    pub scheduled_maintenances: Vec<ScheduledMaintenance>,
}
