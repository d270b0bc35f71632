//! Cart-side payloads of the order API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown wherever the provider left an order field empty.
pub const NOT_AVAILABLE: &str = "N/A";

pub const LABEL_DATACENTER: &str = "dedicated_datacenter";
pub const LABEL_OS: &str = "dedicated_os";
pub const LABEL_REGION: &str = "region";

/// The provider's order-in-progress container for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: String,
    pub item_id: Option<String>,
}

impl Cart {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_id: None,
        }
    }
}

/// Body for adding the server (`/eco`) or an add-on (`/option`) to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub plan_code: String,
    pub pricing_mode: &'static str,
    pub duration: String,
    pub quantity: u32,
}

impl ItemRequest {
    pub fn new(plan_code: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            plan_code: plan_code.into(),
            pricing_mode: "default",
            duration: duration.into(),
            quantity: 1,
        }
    }
}

/// A `{label, value}` pair applied to a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationEntry {
    pub label: String,
    pub value: String,
}

impl ConfigurationEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn is_datacenter(&self) -> bool {
        self.label == LABEL_DATACENTER
    }
}

/// One element of `/item/{id}/requiredConfiguration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredConfiguration {
    pub label: String,
    #[serde(default)]
    pub allowed_values: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

/// Checkout body. The purchase policy is fixed: never auto-pay, always waive the
/// retraction period. No other policy can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    auto_pay_with_preferred_payment_method: bool,
    waive_retractation_period: bool,
}

impl Default for CheckoutRequest {
    fn default() -> Self {
        Self {
            auto_pay_with_preferred_payment_method: false,
            waive_retractation_period: true,
        }
    }
}

impl CheckoutRequest {
    pub fn auto_pay(&self) -> bool {
        self.auto_pay_with_preferred_payment_method
    }

    pub fn waive_retractation(&self) -> bool {
        self.waive_retractation_period
    }
}

/// Outcome of a successful checkout call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutResult {
    pub order_id: Option<String>,
    pub url: Option<String>,
}

impl CheckoutResult {
    /// Reads `orderId` (numeric or string) and `url` from a checkout response.
    pub fn from_value(value: &Value) -> Self {
        Self {
            order_id: value.get("orderId").and_then(scalar_to_string),
            url: value.get("url").and_then(scalar_to_string),
        }
    }

    pub fn order_id_or_marker(&self) -> &str {
        self.order_id.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn url_or_marker(&self) -> &str {
        self.url.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Ids come back as JSON strings or numbers depending on the endpoint.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkout_body_is_fixed() {
        let body = serde_json::to_value(CheckoutRequest::default()).unwrap();
        assert_eq!(
            body,
            json!({"autoPayWithPreferredPaymentMethod": false, "waiveRetractationPeriod": true})
        );
    }

    #[test]
    fn item_request_wire_shape() {
        let body = serde_json::to_value(ItemRequest::new("24ska01", "P1M")).unwrap();
        assert_eq!(
            body,
            json!({"planCode": "24ska01", "pricingMode": "default", "duration": "P1M", "quantity": 1})
        );
    }

    #[test]
    fn checkout_result_accepts_numeric_order_id() {
        let result = CheckoutResult::from_value(&json!({"orderId": 123456, "url": "https://x/o"}));
        assert_eq!(result.order_id_or_marker(), "123456");
        assert_eq!(result.url_or_marker(), "https://x/o");
    }

    #[test]
    fn missing_checkout_fields_render_marker() {
        let result = CheckoutResult::from_value(&json!({"prices": {}}));
        assert_eq!(result.order_id_or_marker(), NOT_AVAILABLE);
        assert_eq!(result.url_or_marker(), NOT_AVAILABLE);
    }
}
