use serde::{Deserialize, Serialize};

/// What to buy and where. Immutable once a run has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Free-form label prefixed to every notification.
    pub iam: String,
    /// OVH subsidiary the cart is created for (e.g. `IE`, `FR`).
    pub zone: String,
    pub plan_code: String,
    pub os: String,
    /// Contract duration in ISO-8601 form, e.g. `P1M`.
    pub duration: String,
    /// Add-on plan codes, attached in order when option attachment is enabled.
    #[serde(default)]
    pub options: Vec<String>,
}

/// Deployment switches for the order pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Attach `TaskSpec::options` to the cart item before checkout.
    #[serde(default)]
    pub attach_options: bool,
}
