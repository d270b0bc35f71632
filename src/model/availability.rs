use serde::{Deserialize, Serialize};

/// States the provider uses to say "no stock here". Anything else is buyable.
pub const UNAVAILABLE_STATES: [&str; 2] = ["unavailable", "unknown"];

/// One entry of `/dedicated/server/datacenter/availabilities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub fqn: String,
    #[serde(default)]
    pub datacenters: Vec<DatacenterAvailability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterAvailability {
    pub datacenter: String,
    #[serde(default)]
    pub availability: Option<String>,
}

impl DatacenterAvailability {
    pub fn new(datacenter: impl Into<String>, availability: impl Into<String>) -> Self {
        Self {
            datacenter: datacenter.into(),
            availability: Some(availability.into()),
        }
    }

    /// Raw state for display; a missing state reads as an empty string.
    pub fn state(&self) -> &str {
        self.availability.as_deref().unwrap_or("")
    }

    /// A location is eligible when it has a name and reports any non-empty state other
    /// than the two negative literals. No positive vocabulary is assumed.
    pub fn is_eligible(&self) -> bool {
        let state = self.state();
        !self.datacenter.trim().is_empty()
            && !state.is_empty()
            && !UNAVAILABLE_STATES.contains(&state)
    }
}

/// The unit picked for purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub fqn: String,
    pub datacenter: String,
    pub availability: String,
}
