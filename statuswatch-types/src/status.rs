//! Status enumerations.
//!
//! Every enum keeps a value it does not recognise as `Other` with the raw
//! string, so a value added upstream never breaks polling and is still shown
//! as published.

use core::fmt;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            /// Unset.
            #[default]
            Unknown,
            /// A value this crate does not know, as received.
            Other(String),
        }

        impl $name {
            /// The wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)*
                    $name::Unknown => "unknown",
                    $name::Other(raw) => raw,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($wire => $name::$variant,)*
                    "" | "unknown" => $name::Unknown,
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                // Statuspage sends null for an impact that was never set.
                let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
                Ok(raw.as_deref().map(Self::from).unwrap_or_default())
            }
        }
    };
}

wire_enum! {
    /// Severity indicator of the overall page status or of an incident's impact.
    pub enum Indicator {
        None => "none",
        Minor => "minor",
        Major => "major",
        Critical => "critical",
        Maintenance => "maintenance",
    }
}

wire_enum! {
    /// Current state of a single component.
    pub enum ComponentStatus {
        Operational => "operational",
        DegradedPerformance => "degraded_performance",
        PartialOutage => "partial_outage",
        MajorOutage => "major_outage",
        UnderMaintenance => "under_maintenance",
    }
}

wire_enum! {
    /// Lifecycle state of an incident (also used by incident updates).
    pub enum IncidentStatus {
        Investigating => "investigating",
        Identified => "identified",
        Monitoring => "monitoring",
        Resolved => "resolved",
        Postmortem => "postmortem",
        /// Updates attached to maintenances reuse this enum.
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Verifying => "verifying",
        Completed => "completed",
    }
}

wire_enum! {
    /// Lifecycle state of a scheduled maintenance.
    pub enum MaintenanceStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Verifying => "verifying",
        Completed => "completed",
    }
}

/// Overall description of the page's current status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Status {
    /// Severity of the overall status.
    pub indicator: Indicator,
    /// Human readable description, e.g. "All Systems Operational".
    pub description: String,
}

impl Status {
    /// Create a status from an indicator and a description.
    pub fn new(indicator: Indicator, description: impl Into<String>) -> Self {
        Self {
            indicator,
            description: description.into(),
        }
    }
}
