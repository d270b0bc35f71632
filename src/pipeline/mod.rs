//! # Order Pipeline
//!
//! The dependent, strictly ordered calls that turn a verified-in-stock unit into an order:
//!
//! 1. create cart → 2. assign cart → 3. add item → 4. read required configuration →
//! 5. apply configuration (and, when enabled, attach add-ons) → 6. read cart summary and
//! checkout info → 7. checkout.
//!
//! ## Failure Policy
//!
//! | Failure | Effect |
//! |---|---|
//! | cart create / assign / add item, cart reads, checkout | fatal |
//! | `dedicated_datacenter` configuration | fatal: the order would no longer be for the unit seen in stock |
//! | any other configuration entry, add-on option | logged at error, run continues |
//! | token cancelled | [`PipelineError::Cancelled`], no error logged |
//!
//! The token is checked before every step and after every configuration entry and
//! add-on. A cart that was already created is left as is; there is no rollback.

pub mod error;
pub mod state;

pub use error::*;
pub use state::*;

use crate::api::OrderApi;
use crate::cancel::CancellationToken;
use crate::events::EventLog;
use crate::model::{
    Cart, CheckoutRequest, CheckoutResult, ConfigurationEntry, ItemRequest, PipelineOptions,
    RequiredConfiguration, Selection, TaskSpec, LABEL_DATACENTER, LABEL_OS, LABEL_REGION,
};
use serde_json::Value;
use tracing::{debug, instrument};

/// One purchase attempt against a fresh cart.
pub struct OrderPipeline<'a> {
    api: &'a dyn OrderApi,
    spec: &'a TaskSpec,
    options: PipelineOptions,
    log: &'a EventLog,
    token: &'a CancellationToken,
    state: PipelineState,
    cart: Option<Cart>,
}

impl<'a> OrderPipeline<'a> {
    pub fn new(
        api: &'a dyn OrderApi,
        spec: &'a TaskSpec,
        options: PipelineOptions,
        log: &'a EventLog,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            api,
            spec,
            options,
            log,
            token,
            state: PipelineState::Idle,
            cart: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The cart created by this run, if it got that far.
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Drives the pipeline to a terminal state and returns the checkout outcome.
    #[instrument(skip_all, fields(plan_code = %self.spec.plan_code, datacenter = %selection.datacenter))]
    pub async fn run(&mut self, selection: &Selection) -> Result<CheckoutResult, PipelineError> {
        let result = self.execute(selection).await;
        let terminal = match &result {
            Ok(_) => PipelineState::Completed,
            Err(PipelineError::Cancelled) => PipelineState::Cancelled,
            Err(_) => PipelineState::Failed,
        };
        self.transition(terminal);
        result
    }

    async fn execute(&mut self, selection: &Selection) -> Result<CheckoutResult, PipelineError> {
        self.checkpoint()?;
        let cart_id = self.create_cart().await?;

        self.checkpoint()?;
        self.assign_cart(&cart_id).await?;

        self.checkpoint()?;
        let item_id = self.add_item(&cart_id).await?;

        self.checkpoint()?;
        let region = self.discover_region(&cart_id, &item_id).await?;

        self.checkpoint()?;
        let entries = [
            ConfigurationEntry::new(LABEL_DATACENTER, selection.datacenter.as_str()),
            ConfigurationEntry::new(LABEL_OS, self.spec.os.as_str()),
            ConfigurationEntry::new(LABEL_REGION, region.unwrap_or_default()),
        ];
        self.apply_configuration(&cart_id, &item_id, &entries)
            .await?;
        self.attach_options(&cart_id, &item_id).await?;
        self.transition(PipelineState::Configured);

        self.checkpoint()?;
        self.read_cart(&cart_id).await?;
        self.transition(PipelineState::CheckoutReady);

        self.checkpoint()?;
        self.checkout(&cart_id).await
    }

    fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.token.is_cancelled() {
            debug!(state = %self.state, "stop requested");
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }

    async fn create_cart(&mut self) -> Result<String, PipelineError> {
        self.log
            .info(format!("Creating cart for zone {}...", self.spec.zone));
        let cart_id = self
            .api
            .create_cart(&self.spec.zone, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::CreateCart, e))?
            .ok_or(PipelineError::MissingCartId)?;

        self.log
            .success(format!("Cart created, ID: {}", cart_id));
        self.cart = Some(Cart::new(cart_id.as_str()));
        self.transition(PipelineState::CartCreated);
        Ok(cart_id)
    }

    async fn assign_cart(&mut self, cart_id: &str) -> Result<(), PipelineError> {
        self.log.info(format!("Assigning cart {}...", cart_id));
        self.api
            .assign_cart(cart_id, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::AssignCart, e))?;

        self.log.success("Cart assigned");
        self.transition(PipelineState::CartAssigned);
        Ok(())
    }

    async fn add_item(&mut self, cart_id: &str) -> Result<String, PipelineError> {
        let plan_code = &self.spec.plan_code;
        self.log.info(format!(
            "Adding {} to cart {}...",
            plan_code, cart_id
        ));
        let item = ItemRequest::new(plan_code.as_str(), self.spec.duration.as_str());
        let item_id = self
            .api
            .add_item(cart_id, &item, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::AddItem, e))?
            .ok_or_else(|| PipelineError::MissingItemId {
                plan_code: plan_code.clone(),
            })?;

        self.log
            .success(format!("Item added, item ID: {}", item_id));
        if let Some(cart) = self.cart.as_mut() {
            cart.item_id = Some(item_id.clone());
        }
        self.transition(PipelineState::ItemAdded);
        Ok(item_id)
    }

    async fn discover_region(
        &self,
        cart_id: &str,
        item_id: &str,
    ) -> Result<Option<String>, PipelineError> {
        self.log.info(format!(
            "Checking required configuration of item {}...",
            item_id
        ));
        let required = self
            .api
            .required_configuration(cart_id, item_id, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::RequiredConfiguration, e))?;
        self.log.info("Required configuration retrieved");

        Ok(region_from(&required))
    }

    async fn apply_configuration(
        &self,
        cart_id: &str,
        item_id: &str,
        entries: &[ConfigurationEntry],
    ) -> Result<(), PipelineError> {
        for entry in entries {
            if entry.value.trim().is_empty() {
                self.log.warning(format!(
                    "Value for configuration {} is empty, skipping",
                    entry.label
                ));
                continue;
            }

            self.log.info(format!(
                "Configuring item {}: {} = {}",
                item_id, entry.label, entry.value
            ));
            if let Err(e) = self
                .api
                .configure_item(cart_id, item_id, entry, self.token)
                .await
            {
                if e.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                self.log.error(format!(
                    "Setting {} = {} failed: {}",
                    entry.label, entry.value, e
                ));
                if entry.is_datacenter() {
                    return Err(PipelineError::CriticalConfiguration {
                        label: entry.label.clone(),
                        source: e,
                    });
                }
            }

            self.checkpoint()?;
        }
        Ok(())
    }

    async fn attach_options(&self, cart_id: &str, item_id: &str) -> Result<(), PipelineError> {
        if self.spec.options.is_empty() {
            return Ok(());
        }
        if !self.options.attach_options {
            debug!(count = self.spec.options.len(), "option attachment disabled");
            return Ok(());
        }

        self.log
            .info(format!("Adding options to item {}...", item_id));
        for code in &self.spec.options {
            self.log.info(format!("Adding option: {}", code));
            let option = ItemRequest::new(code.as_str(), self.spec.duration.as_str());
            match self
                .api
                .add_option(cart_id, item_id, &option, self.token)
                .await
            {
                Ok(()) => self.log.success(format!("Option {} added", code)),
                Err(e) if e.is_cancelled() => return Err(PipelineError::Cancelled),
                Err(e) => self
                    .log
                    .error(format!("Adding option {} failed: {}", code, e)),
            }

            self.checkpoint()?;
        }
        Ok(())
    }

    async fn read_cart(&self, cart_id: &str) -> Result<(), PipelineError> {
        self.log
            .info(format!("Fetching summary of cart {}...", cart_id));
        let summary = self
            .api
            .cart_summary(cart_id, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::CartSummary, e))?;
        debug!(%summary, "cart summary");
        self.log.info("Cart summary retrieved");

        self.checkpoint()?;
        self.log
            .info(format!("Fetching checkout information for cart {}...", cart_id));
        let info = self
            .api
            .checkout_info(cart_id, self.token)
            .await
            .map_err(|e| PipelineError::step(Step::CheckoutInfo, e))?;
        debug!(%info, "checkout info");
        match total_price(&info) {
            Some(total) => self
                .log
                .info(format!("Checkout information retrieved, total {}", total)),
            None => self.log.info("Checkout information retrieved"),
        }
        Ok(())
    }

    async fn checkout(&self, cart_id: &str) -> Result<CheckoutResult, PipelineError> {
        self.log
            .info(format!("Checking out cart {}...", cart_id));
        let result = self
            .api
            .checkout(cart_id, &CheckoutRequest::default(), self.token)
            .await
            .map_err(|e| PipelineError::step(Step::Checkout, e))?
            .ok_or(PipelineError::EmptyCheckout)?;

        self.log.success("Checkout request submitted!");
        self.log.success(format!(
            "Order created! Order ID: {}",
            result.order_id_or_marker()
        ));
        self.log
            .info(format!("Order URL: {}", result.url_or_marker()));
        Ok(result)
    }
}

/// First allowed value of the `region` label, if the provider asks for one.
fn region_from(required: &[RequiredConfiguration]) -> Option<String> {
    required
        .iter()
        .filter(|c| c.label == LABEL_REGION)
        .find_map(|c| c.allowed_values.first().cloned())
}

fn total_price(info: &Value) -> Option<&str> {
    info.pointer("/prices/withTax/text").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, CallKind, MockOrderApi, Reply};
    use crate::api::ApiError;
    use crate::model::Severity;
    use serde_json::json;

    fn spec() -> TaskSpec {
        TaskSpec {
            iam: "sniper-1".into(),
            zone: "IE".into(),
            plan_code: "24ska01".into(),
            os: "none_64.en".into(),
            duration: "P1M".into(),
            options: vec!["ram-64g".into(), "softraid-2x2000sa".into()],
        }
    }

    fn selection() -> Selection {
        Selection {
            fqn: "24ska01.ram-64g.softraid-2x2000sa".into(),
            datacenter: "gra".into(),
            availability: "1H-high".into(),
        }
    }

    fn http_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            body: "boom".into(),
        }
    }

    fn region_config() -> Reply {
        Reply::RequiredConfiguration(vec![RequiredConfiguration {
            label: LABEL_REGION.into(),
            allowed_values: vec!["europe".into(), "canada".into()],
            required: true,
        }])
    }

    /// Scripts cart creation through required configuration.
    fn expect_until_item(mock: &MockOrderApi) {
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        mock.expect(CallKind::AssignCart).return_ok(Reply::Unit);
        mock.expect(CallKind::AddItem).return_ok(Reply::id("77"));
        mock.expect(CallKind::RequiredConfiguration)
            .return_ok(region_config());
    }

    fn expect_checkout(mock: &MockOrderApi, result: Option<CheckoutResult>) {
        mock.expect(CallKind::CartSummary)
            .return_ok(Reply::Json(json!({"cartId": "cart-1"})));
        mock.expect(CallKind::CheckoutInfo)
            .return_ok(Reply::Json(json!({"prices": {"withTax": {"text": "42.00 €"}}})));
        mock.expect(CallKind::Checkout).return_ok(Reply::Checkout(result));
    }

    fn configured_entries(mock: &MockOrderApi) -> Vec<ConfigurationEntry> {
        mock.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::ConfigureItem { entry, .. } => Some(entry),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn happy_path_runs_every_step_in_order() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        for _ in 0..3 {
            mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        }
        expect_checkout(
            &mock,
            Some(CheckoutResult {
                order_id: Some("123456".into()),
                url: Some("https://ovh/order/123456".into()),
            }),
        );

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let result = pipeline.run(&selection()).await.unwrap();
        assert_eq!(result.order_id_or_marker(), "123456");
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert_eq!(
            pipeline.cart(),
            Some(&Cart {
                id: "cart-1".into(),
                item_id: Some("77".into())
            })
        );

        assert_eq!(
            mock.call_kinds(),
            vec![
                CallKind::CreateCart,
                CallKind::AssignCart,
                CallKind::AddItem,
                CallKind::RequiredConfiguration,
                CallKind::ConfigureItem,
                CallKind::ConfigureItem,
                CallKind::ConfigureItem,
                CallKind::CartSummary,
                CallKind::CheckoutInfo,
                CallKind::Checkout,
            ]
        );
        assert_eq!(
            configured_entries(&mock),
            vec![
                ConfigurationEntry::new(LABEL_DATACENTER, "gra"),
                ConfigurationEntry::new(LABEL_OS, "none_64.en"),
                ConfigurationEntry::new(LABEL_REGION, "europe"),
            ]
        );

        let calls = mock.calls();
        assert_eq!(
            calls[0],
            ApiCall::CreateCart {
                subsidiary: "IE".into()
            }
        );
        assert_eq!(
            calls[2],
            ApiCall::AddItem {
                cart_id: "cart-1".into(),
                item: ItemRequest::new("24ska01", "P1M"),
            }
        );
        match calls.last().unwrap() {
            ApiCall::Checkout { request, .. } => {
                assert!(!request.auto_pay());
                assert!(request.waive_retractation());
            }
            other => panic!("expected checkout, got {:?}", other),
        }

        let messages: Vec<_> = log.snapshot().into_iter().map(|e| e.message).collect();
        assert!(messages.contains(&"Checkout information retrieved, total 42.00 €".to_string()));
        assert!(messages.contains(&"Order created! Order ID: 123456".to_string()));
        mock.verify();
    }

    #[tokio::test]
    async fn datacenter_failure_aborts_before_other_entries() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        mock.expect(CallKind::ConfigureItem)
            .return_err(http_error(400));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::CriticalConfiguration { ref label, .. } if label == LABEL_DATACENTER
        ));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(configured_entries(&mock).len(), 1);
        assert!(!mock.call_kinds().contains(&CallKind::Checkout));
        mock.verify();
    }

    #[tokio::test]
    async fn os_failure_is_logged_and_run_continues() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        mock.expect(CallKind::ConfigureItem)
            .return_err(http_error(400));
        mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        expect_checkout(&mock, Some(CheckoutResult::default()));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let result = pipeline.run(&selection()).await.unwrap();
        assert_eq!(result.order_id_or_marker(), "N/A");
        assert_eq!(pipeline.state(), PipelineState::Completed);

        let errors: Vec<_> = log
            .snapshot()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Setting dedicated_os = none_64.en failed"));
        mock.verify();
    }

    #[tokio::test]
    async fn missing_region_is_skipped_with_warning() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        mock.expect(CallKind::AssignCart).return_ok(Reply::Unit);
        mock.expect(CallKind::AddItem).return_ok(Reply::id("77"));
        mock.expect(CallKind::RequiredConfiguration)
            .return_ok(Reply::RequiredConfiguration(vec![]));
        mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        expect_checkout(&mock, Some(CheckoutResult::default()));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);
        pipeline.run(&selection()).await.unwrap();

        assert_eq!(configured_entries(&mock).len(), 2);
        assert!(log.snapshot().iter().any(|e| e.severity == Severity::Warning
            && e.message == "Value for configuration region is empty, skipping"));
        mock.verify();
    }

    #[tokio::test]
    async fn missing_cart_id_is_fatal() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::Id(None));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingCartId));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(mock.call_kinds(), vec![CallKind::CreateCart]);
    }

    #[tokio::test]
    async fn assign_failure_is_fatal() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        mock.expect(CallKind::AssignCart).return_err(http_error(403));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Step {
                step: Step::AssignCart,
                ..
            }
        ));
        assert_eq!(err.to_string(), "cart assignment failed: OVH API request failed (403): boom");
    }

    #[tokio::test]
    async fn cart_summary_failure_is_fatal() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        for _ in 0..3 {
            mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        }
        mock.expect(CallKind::CartSummary).return_err(http_error(500));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Step {
                step: Step::CartSummary,
                ..
            }
        ));
        assert!(!mock.call_kinds().contains(&CallKind::Checkout));
        mock.verify();
    }

    #[tokio::test]
    async fn empty_checkout_is_fatal() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        for _ in 0..3 {
            mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        }
        expect_checkout(&mock, None);

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyCheckout));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[tokio::test]
    async fn cancel_before_start_makes_no_calls() {
        let mock = MockOrderApi::new();
        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        token.cancel();

        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);
        let err = pipeline.run(&selection()).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
        assert!(mock.calls().is_empty());
        assert!(log.snapshot().is_empty());
    }

    #[tokio::test]
    async fn cancel_after_cart_created_skips_checkout_without_rollback() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        mock.expect(CallKind::CreateCart)
            .cancelling(&token)
            .return_ok(Reply::id("cart-1"));

        let spec = spec();
        let log = EventLog::default();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
        assert_eq!(pipeline.cart().map(|c| c.id.as_str()), Some("cart-1"));
        assert_eq!(mock.call_kinds(), vec![CallKind::CreateCart]);
        assert!(log
            .snapshot()
            .iter()
            .all(|e| e.severity != Severity::Error));
        mock.verify();
    }

    #[tokio::test]
    async fn cancel_between_configuration_entries() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        expect_until_item(&mock);
        mock.expect(CallKind::ConfigureItem)
            .cancelling(&token)
            .return_ok(Reply::Unit);

        let spec = spec();
        let log = EventLog::default();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(configured_entries(&mock).len(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn in_flight_request_is_aborted_as_cancellation() {
        let mock = MockOrderApi::new();
        let token = CancellationToken::new();
        mock.expect(CallKind::CreateCart).return_ok(Reply::id("cart-1"));
        mock.expect(CallKind::AssignCart).hang();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let spec = spec();
        let log = EventLog::default();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        let err = pipeline.run(&selection()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
        assert!(log
            .snapshot()
            .iter()
            .all(|e| e.severity != Severity::Error));
    }

    #[tokio::test]
    async fn option_failures_do_not_abort_when_attachment_enabled() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        for _ in 0..3 {
            mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        }
        mock.expect(CallKind::AddOption).return_err(http_error(404));
        mock.expect(CallKind::AddOption).return_ok(Reply::Unit);
        expect_checkout(&mock, Some(CheckoutResult::default()));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let options = PipelineOptions {
            attach_options: true,
        };
        let mut pipeline = OrderPipeline::new(&mock, &spec, options, &log, &token);

        pipeline.run(&selection()).await.unwrap();

        let added: Vec<_> = mock
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::AddOption { option, .. } => Some(option.plan_code),
                _ => None,
            })
            .collect();
        assert_eq!(added, ["ram-64g", "softraid-2x2000sa"]);
        assert!(log
            .snapshot()
            .iter()
            .any(|e| e.severity == Severity::Error && e.message.starts_with("Adding option ram-64g failed")));
        mock.verify();
    }

    #[tokio::test]
    async fn options_are_not_attached_by_default() {
        let mock = MockOrderApi::new();
        expect_until_item(&mock);
        for _ in 0..3 {
            mock.expect(CallKind::ConfigureItem).return_ok(Reply::Unit);
        }
        expect_checkout(&mock, Some(CheckoutResult::default()));

        let spec = spec();
        let log = EventLog::default();
        let token = CancellationToken::new();
        let mut pipeline =
            OrderPipeline::new(&mock, &spec, PipelineOptions::default(), &log, &token);

        pipeline.run(&selection()).await.unwrap();
        assert!(!mock.call_kinds().contains(&CallKind::AddOption));
        mock.verify();
    }

    #[test]
    fn region_takes_first_allowed_value() {
        let required = vec![
            RequiredConfiguration {
                label: LABEL_OS.into(),
                allowed_values: vec!["debian".into()],
                required: true,
            },
            RequiredConfiguration {
                label: LABEL_REGION.into(),
                allowed_values: vec!["canada".into(), "europe".into()],
                required: true,
            },
        ];
        assert_eq!(region_from(&required).as_deref(), Some("canada"));
        assert_eq!(region_from(&[]), None);
    }
}
