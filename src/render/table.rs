//! Plain text tables.

use std::fmt::Write;

use statuswatch_types::{
    Component, ComponentsResponse, Incident, IncidentsResponse, ScheduledMaintenance,
    ScheduledMaintenancesResponse, Snapshot, Status, StatusResponse,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::format_timestamp;

/// Types that render as one or more titled tables.
pub trait Tables {
    fn tables(&self) -> String;
}

#[derive(Tabled)]
struct StatusRow<'a> {
    #[tabled(rename = "Indicator")]
    indicator: &'a str,
    #[tabled(rename = "Description")]
    description: &'a str,
}

#[derive(Tabled)]
struct ComponentRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Description")]
    description: &'a str,
    #[tabled(rename = "Status")]
    status: &'a str,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct IncidentRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Status")]
    status: &'a str,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Latest Update")]
    latest_update: &'a str,
}

#[derive(Tabled)]
struct MaintenanceRow<'a> {
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "Impact")]
    impact: &'a str,
    #[tabled(rename = "Status")]
    status: &'a str,
    #[tabled(rename = "Scheduled For")]
    scheduled_for: String,
    #[tabled(rename = "Scheduled Until")]
    scheduled_until: String,
}

fn status_table(status: &Status) -> String {
    let rows = [StatusRow {
        indicator: status.indicator.as_str(),
        description: &status.description,
    }];
    Table::new(rows).with(Style::markdown()).to_string()
}

fn components_table(components: &[Component]) -> String {
    let rows = components.iter().map(|c| ComponentRow {
        name: &c.name,
        description: c.description.as_deref().unwrap_or_default(),
        status: c.status.as_str(),
        updated: format_timestamp(c.updated_at),
    });
    Table::new(rows).with(Style::markdown()).to_string()
}

fn incidents_table(incidents: &[Incident]) -> String {
    let rows = incidents.iter().map(|i| IncidentRow {
        name: &i.name,
        status: i.status.as_str(),
        updated: format_timestamp(i.updated_at),
        latest_update: i.latest_update().map(|u| u.body.as_str()).unwrap_or_default(),
    });
    Table::new(rows).with(Style::markdown()).to_string()
}

fn maintenances_table(maintenances: &[ScheduledMaintenance]) -> String {
    let rows = maintenances.iter().map(|m| MaintenanceRow {
        name: &m.name,
        impact: m.impact.as_str(),
        status: m.status.as_str(),
        scheduled_for: format_timestamp(m.scheduled_for),
        scheduled_until: format_timestamp(m.scheduled_until),
    });
    Table::new(rows).with(Style::markdown()).to_string()
}

fn section(out: &mut String, title: &str, table: String) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    // Writing to a String cannot fail.
    let _ = write!(out, "# {}\n\n{}\n", title, table);
}

impl Tables for Snapshot {
    fn tables(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Status", status_table(&self.status));
        if !self.components.is_empty() {
            section(&mut out, "Components", components_table(&self.components));
        }
        if !self.incidents.is_empty() {
            section(&mut out, "Incidents", incidents_table(&self.incidents));
        }
        if !self.scheduled_maintenances.is_empty() {
            section(
                &mut out,
                "Scheduled Maintenances",
                maintenances_table(&self.scheduled_maintenances),
            );
        }
        out
    }
}

impl Tables for StatusResponse {
    fn tables(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Status", status_table(&self.status));
        out
    }
}

impl Tables for ComponentsResponse {
    fn tables(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Components", components_table(&self.components));
        out
    }
}

impl Tables for IncidentsResponse {
    fn tables(&self) -> String {
        let mut out = String::new();
        section(&mut out, "Incidents", incidents_table(&self.incidents));
        out
    }
}

impl Tables for ScheduledMaintenancesResponse {
    fn tables(&self) -> String {
        let mut out = String::new();
        section(
            &mut out,
            "Scheduled Maintenances",
            maintenances_table(&self.scheduled_maintenances),
        );
        out
    }
}
