//! # Order API
//!
//! The seam between the orchestration logic and OVH. [`OrderApi`] names one method per
//! endpoint the purchase flow touches; [`OvhClient`] implements it over HTTP and
//! [`mock::MockOrderApi`] implements it from a scripted expectation queue.
//!
//! Every method takes the run's [`CancellationToken`]. Implementations must abort the
//! in-flight request when it fires and report [`ApiError::Cancelled`].

pub mod client;
pub mod error;
pub mod mock;

pub use client::*;
pub use error::*;

use crate::cancel::CancellationToken;
use crate::model::{
    AvailabilityRecord, CheckoutRequest, CheckoutResult, ConfigurationEntry, ItemRequest,
    RequiredConfiguration,
};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait OrderApi: Send + Sync {
    /// `GET /dedicated/server/datacenter/availabilities?planCode=..`
    async fn availabilities(
        &self,
        plan_code: &str,
        token: &CancellationToken,
    ) -> Result<Vec<AvailabilityRecord>, ApiError>;

    /// `POST /order/cart`. `None` when the response carried no cart id.
    async fn create_cart(
        &self,
        subsidiary: &str,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError>;

    /// `POST /order/cart/{cartId}/assign`
    async fn assign_cart(&self, cart_id: &str, token: &CancellationToken) -> Result<(), ApiError>;

    /// `POST /order/cart/{cartId}/eco`. `None` when the response carried no item id.
    async fn add_item(
        &self,
        cart_id: &str,
        item: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError>;

    /// `GET /order/cart/{cartId}/item/{itemId}/requiredConfiguration`
    async fn required_configuration(
        &self,
        cart_id: &str,
        item_id: &str,
        token: &CancellationToken,
    ) -> Result<Vec<RequiredConfiguration>, ApiError>;

    /// `POST /order/cart/{cartId}/item/{itemId}/configuration`
    async fn configure_item(
        &self,
        cart_id: &str,
        item_id: &str,
        entry: &ConfigurationEntry,
        token: &CancellationToken,
    ) -> Result<(), ApiError>;

    /// `POST /order/cart/{cartId}/item/{itemId}/option`
    async fn add_option(
        &self,
        cart_id: &str,
        item_id: &str,
        option: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<(), ApiError>;

    /// `GET /order/cart/{cartId}`
    async fn cart_summary(&self, cart_id: &str, token: &CancellationToken)
        -> Result<Value, ApiError>;

    /// `GET /order/cart/{cartId}/checkout`
    async fn checkout_info(
        &self,
        cart_id: &str,
        token: &CancellationToken,
    ) -> Result<Value, ApiError>;

    /// `POST /order/cart/{cartId}/checkout`. `None` when the API returned no body.
    async fn checkout(
        &self,
        cart_id: &str,
        request: &CheckoutRequest,
        token: &CancellationToken,
    ) -> Result<Option<CheckoutResult>, ApiError>;
}
