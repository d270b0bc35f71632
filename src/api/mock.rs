//! # Mock Order API
//!
//! Scripted [`OrderApi`] for testing the scanner, the pipeline and the controller without
//! a network.
//!
//! Expectations are queued in call order. Each incoming call pops the front expectation;
//! a call of a different kind, or a call with nothing queued, panics. Every call is
//! recorded so tests can assert on what was (or was not) sent.
//!
//! ```ignore
//! let mock = MockOrderApi::new();
//! mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
//! mock.expect(CallKind::AssignCart).cancelling(&token).return_ok(Reply::Unit);
//!
//! // run code under test...
//! mock.verify(); // every expectation consumed
//! ```

use super::{ApiError, OrderApi};
use crate::cancel::{abortable, CancellationToken};
use crate::model::{
    AvailabilityRecord, CheckoutRequest, CheckoutResult, ConfigurationEntry, ItemRequest,
    RequiredConfiguration,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// The endpoint a call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Availabilities,
    CreateCart,
    AssignCart,
    AddItem,
    RequiredConfiguration,
    ConfigureItem,
    AddOption,
    CartSummary,
    CheckoutInfo,
    Checkout,
}

/// A recorded call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Availabilities { plan_code: String },
    CreateCart { subsidiary: String },
    AssignCart { cart_id: String },
    AddItem { cart_id: String, item: ItemRequest },
    RequiredConfiguration { cart_id: String, item_id: String },
    ConfigureItem { cart_id: String, item_id: String, entry: ConfigurationEntry },
    AddOption { cart_id: String, item_id: String, option: ItemRequest },
    CartSummary { cart_id: String },
    CheckoutInfo { cart_id: String },
    Checkout { cart_id: String, request: CheckoutRequest },
}

impl ApiCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ApiCall::Availabilities { .. } => CallKind::Availabilities,
            ApiCall::CreateCart { .. } => CallKind::CreateCart,
            ApiCall::AssignCart { .. } => CallKind::AssignCart,
            ApiCall::AddItem { .. } => CallKind::AddItem,
            ApiCall::RequiredConfiguration { .. } => CallKind::RequiredConfiguration,
            ApiCall::ConfigureItem { .. } => CallKind::ConfigureItem,
            ApiCall::AddOption { .. } => CallKind::AddOption,
            ApiCall::CartSummary { .. } => CallKind::CartSummary,
            ApiCall::CheckoutInfo { .. } => CallKind::CheckoutInfo,
            ApiCall::Checkout { .. } => CallKind::Checkout,
        }
    }
}

/// Canned successful responses.
#[derive(Debug, Clone)]
pub enum Reply {
    Availabilities(Vec<AvailabilityRecord>),
    Id(Option<String>),
    Unit,
    RequiredConfiguration(Vec<RequiredConfiguration>),
    Json(Value),
    Checkout(Option<CheckoutResult>),
}

impl Reply {
    pub fn id(id: impl Into<String>) -> Self {
        Reply::Id(Some(id.into()))
    }
}

enum Outcome {
    Reply(Reply),
    Fail(ApiError),
    Hang,
}

struct Expectation {
    kind: CallKind,
    outcome: Outcome,
    cancel: Option<CancellationToken>,
}

/// An [`OrderApi`] driven by a queue of expectations.
#[derive(Clone, Default)]
pub struct MockOrderApi {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl MockOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an expectation for the next call; finish it with `return_ok`, `return_err`
    /// or `hang`.
    pub fn expect(&self, kind: CallKind) -> ExpectationBuilder {
        ExpectationBuilder {
            kind,
            cancel: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_kinds(&self) -> Vec<CallKind> {
        self.calls().iter().map(ApiCall::kind).collect()
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap();
        if !remaining.is_empty() {
            let kinds: Vec<_> = remaining.iter().map(|e| e.kind).collect();
            panic!("Not all expectations were met. Remaining: {:?}", kinds);
        }
    }

    async fn serve(&self, call: ApiCall, token: &CancellationToken) -> Result<Reply, ApiError> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);

        let expectation = self.expectations.lock().unwrap().pop_front();
        let expectation = match expectation {
            Some(e) => e,
            None => panic!("Unexpected request {:?}: no expectations left", kind),
        };
        if expectation.kind != kind {
            panic!(
                "Expectation mismatch: expected {:?}, got {:?}",
                expectation.kind, kind
            );
        }
        if let Some(cancel) = &expectation.cancel {
            cancel.cancel();
        }

        match expectation.outcome {
            Outcome::Reply(reply) => Ok(reply),
            Outcome::Fail(error) => Err(error),
            Outcome::Hang => {
                abortable(token, std::future::pending::<Result<Reply, ApiError>>()).await
            }
        }
    }
}

/// Builder returned by [`MockOrderApi::expect`].
pub struct ExpectationBuilder {
    kind: CallKind,
    cancel: Option<CancellationToken>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Cancels `token` when this call is served, simulating a stop that lands right
    /// after the response arrived.
    pub fn cancelling(mut self, token: &CancellationToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    pub fn return_ok(self, reply: Reply) {
        self.push(Outcome::Reply(reply));
    }

    pub fn return_err(self, error: ApiError) {
        self.push(Outcome::Fail(error));
    }

    /// Never answers; the call only ends when the run's token is cancelled.
    pub fn hang(self) {
        self.push(Outcome::Hang);
    }

    fn push(self, outcome: Outcome) {
        self.expectations.lock().unwrap().push_back(Expectation {
            kind: self.kind,
            outcome,
            cancel: self.cancel,
        });
    }
}

fn wrong_reply(kind: CallKind, reply: Reply) -> ! {
    panic!("Reply {:?} does not fit a {:?} call", reply, kind)
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn availabilities(
        &self,
        plan_code: &str,
        token: &CancellationToken,
    ) -> Result<Vec<AvailabilityRecord>, ApiError> {
        let call = ApiCall::Availabilities {
            plan_code: plan_code.to_string(),
        };
        match self.serve(call, token).await? {
            Reply::Availabilities(records) => Ok(records),
            other => wrong_reply(CallKind::Availabilities, other),
        }
    }

    async fn create_cart(
        &self,
        subsidiary: &str,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError> {
        let call = ApiCall::CreateCart {
            subsidiary: subsidiary.to_string(),
        };
        match self.serve(call, token).await? {
            Reply::Id(id) => Ok(id),
            other => wrong_reply(CallKind::CreateCart, other),
        }
    }

    async fn assign_cart(&self, cart_id: &str, token: &CancellationToken) -> Result<(), ApiError> {
        let call = ApiCall::AssignCart {
            cart_id: cart_id.to_string(),
        };
        self.serve(call, token).await.map(|_| ())
    }

    async fn add_item(
        &self,
        cart_id: &str,
        item: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError> {
        let call = ApiCall::AddItem {
            cart_id: cart_id.to_string(),
            item: item.clone(),
        };
        match self.serve(call, token).await? {
            Reply::Id(id) => Ok(id),
            other => wrong_reply(CallKind::AddItem, other),
        }
    }

    async fn required_configuration(
        &self,
        cart_id: &str,
        item_id: &str,
        token: &CancellationToken,
    ) -> Result<Vec<RequiredConfiguration>, ApiError> {
        let call = ApiCall::RequiredConfiguration {
            cart_id: cart_id.to_string(),
            item_id: item_id.to_string(),
        };
        match self.serve(call, token).await? {
            Reply::RequiredConfiguration(list) => Ok(list),
            Reply::Unit => Ok(Vec::new()),
            other => wrong_reply(CallKind::RequiredConfiguration, other),
        }
    }

    async fn configure_item(
        &self,
        cart_id: &str,
        item_id: &str,
        entry: &ConfigurationEntry,
        token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let call = ApiCall::ConfigureItem {
            cart_id: cart_id.to_string(),
            item_id: item_id.to_string(),
            entry: entry.clone(),
        };
        self.serve(call, token).await.map(|_| ())
    }

    async fn add_option(
        &self,
        cart_id: &str,
        item_id: &str,
        option: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let call = ApiCall::AddOption {
            cart_id: cart_id.to_string(),
            item_id: item_id.to_string(),
            option: option.clone(),
        };
        self.serve(call, token).await.map(|_| ())
    }

    async fn cart_summary(
        &self,
        cart_id: &str,
        token: &CancellationToken,
    ) -> Result<Value, ApiError> {
        let call = ApiCall::CartSummary {
            cart_id: cart_id.to_string(),
        };
        match self.serve(call, token).await? {
            Reply::Json(value) => Ok(value),
            Reply::Unit => Ok(Value::Null),
            other => wrong_reply(CallKind::CartSummary, other),
        }
    }

    async fn checkout_info(
        &self,
        cart_id: &str,
        token: &CancellationToken,
    ) -> Result<Value, ApiError> {
        let call = ApiCall::CheckoutInfo {
            cart_id: cart_id.to_string(),
        };
        match self.serve(call, token).await? {
            Reply::Json(value) => Ok(value),
            Reply::Unit => Ok(Value::Null),
            other => wrong_reply(CallKind::CheckoutInfo, other),
        }
    }

    async fn checkout(
        &self,
        cart_id: &str,
        request: &CheckoutRequest,
        token: &CancellationToken,
    ) -> Result<Option<CheckoutResult>, ApiError> {
        let call = ApiCall::Checkout {
            cart_id: cart_id.to_string(),
            request: *request,
        };
        match self.serve(call, token).await? {
            Reply::Checkout(result) => Ok(result),
            other => wrong_reply(CallKind::Checkout, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_expectations_in_order_and_records_calls() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        mock.expect(CallKind::AssignCart).return_ok(Reply::Unit);

        assert_eq!(
            mock.create_cart("IE", &token).await.unwrap().as_deref(),
            Some("cart-1")
        );
        mock.assign_cart("cart-1", &token).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                ApiCall::CreateCart {
                    subsidiary: "IE".into()
                },
                ApiCall::AssignCart {
                    cart_id: "cart-1".into()
                },
            ]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn hanging_call_ends_on_cancel() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        mock.expect(CallKind::AssignCart).hang();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = mock.assign_cart("cart-1", &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    #[should_panic(expected = "Expectation mismatch")]
    async fn wrong_call_order_panics() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        let _ = mock.assign_cart("cart-1", &token).await;
    }
}
