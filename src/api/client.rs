//! # HTTP Order Client
//!
//! [`OvhClient`] talks to the OVH v1 API (`https://{endpoint}/1.0`). It attaches the
//! application and consumer headers; request signing is left to whatever sits in front
//! of the endpoint (a signing proxy can be configured as a full `http(s)://` base URL).

use super::{ApiError, OrderApi};
use crate::cancel::{abortable, CancellationToken};
use crate::model::{
    scalar_to_string, AvailabilityRecord, CheckoutRequest, CheckoutResult, ConfigurationEntry,
    Credentials, ItemRequest, RequiredConfiguration,
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!("ovh-sniper/", env!("CARGO_PKG_VERSION"));

/// Order API client bound to one set of credentials.
#[derive(Clone)]
pub struct OvhClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl OvhClient {
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url(&credentials.endpoint),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/1.0{}", self.base_url, path)
    }

    /// Issues one request; `Ok(None)` for 204 or an empty body.
    #[instrument(skip(self, query, body, token))]
    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        token: &CancellationToken,
    ) -> Result<Option<Value>, ApiError> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header("X-Ovh-Application", &self.credentials.app_key)
            .header("X-Ovh-Consumer", &self.credentials.consumer_key);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        abortable(token, send(request)).await
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<Option<Value>, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(status = status.as_u16(), "response");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

/// Normalises a configured endpoint into a base URL without a trailing slash.
pub fn base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

fn decode<T: DeserializeOwned + Default>(value: Option<Value>) -> Result<T, ApiError> {
    match value {
        Some(Value::Null) | None => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

fn id_field(value: Option<&Value>, field: &str) -> Option<String> {
    value.and_then(|v| v.get(field)).and_then(scalar_to_string)
}

fn to_body<T: Serialize>(payload: &T) -> Result<Option<Value>, ApiError> {
    Ok(Some(serde_json::to_value(payload)?))
}

#[async_trait]
impl OrderApi for OvhClient {
    async fn availabilities(
        &self,
        plan_code: &str,
        token: &CancellationToken,
    ) -> Result<Vec<AvailabilityRecord>, ApiError> {
        let value = self
            .call(
                Method::GET,
                "/dedicated/server/datacenter/availabilities",
                &[("planCode", plan_code)],
                None,
                token,
            )
            .await?;
        decode(value)
    }

    async fn create_cart(
        &self,
        subsidiary: &str,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError> {
        let body = json!({ "ovhSubsidiary": subsidiary });
        let value = self
            .call(Method::POST, "/order/cart", &[], Some(body), token)
            .await?;
        Ok(id_field(value.as_ref(), "cartId"))
    }

    async fn assign_cart(&self, cart_id: &str, token: &CancellationToken) -> Result<(), ApiError> {
        let path = format!("/order/cart/{}/assign", cart_id);
        self.call(Method::POST, &path, &[], None, token).await?;
        Ok(())
    }

    async fn add_item(
        &self,
        cart_id: &str,
        item: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<Option<String>, ApiError> {
        let path = format!("/order/cart/{}/eco", cart_id);
        let value = self
            .call(Method::POST, &path, &[], to_body(item)?, token)
            .await?;
        Ok(id_field(value.as_ref(), "itemId"))
    }

    async fn required_configuration(
        &self,
        cart_id: &str,
        item_id: &str,
        token: &CancellationToken,
    ) -> Result<Vec<RequiredConfiguration>, ApiError> {
        let path = format!("/order/cart/{}/item/{}/requiredConfiguration", cart_id, item_id);
        let value = self.call(Method::GET, &path, &[], None, token).await?;
        decode(value)
    }

    async fn configure_item(
        &self,
        cart_id: &str,
        item_id: &str,
        entry: &ConfigurationEntry,
        token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let path = format!("/order/cart/{}/item/{}/configuration", cart_id, item_id);
        self.call(Method::POST, &path, &[], to_body(entry)?, token)
            .await?;
        Ok(())
    }

    async fn add_option(
        &self,
        cart_id: &str,
        item_id: &str,
        option: &ItemRequest,
        token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let path = format!("/order/cart/{}/item/{}/option", cart_id, item_id);
        self.call(Method::POST, &path, &[], to_body(option)?, token)
            .await?;
        Ok(())
    }

    async fn cart_summary(
        &self,
        cart_id: &str,
        token: &CancellationToken,
    ) -> Result<Value, ApiError> {
        let path = format!("/order/cart/{}", cart_id);
        let value = self.call(Method::GET, &path, &[], None, token).await?;
        Ok(value.unwrap_or(Value::Null))
    }

    async fn checkout_info(
        &self,
        cart_id: &str,
        token: &CancellationToken,
    ) -> Result<Value, ApiError> {
        let path = format!("/order/cart/{}/checkout", cart_id);
        let value = self.call(Method::GET, &path, &[], None, token).await?;
        Ok(value.unwrap_or(Value::Null))
    }

    async fn checkout(
        &self,
        cart_id: &str,
        request: &CheckoutRequest,
        token: &CancellationToken,
    ) -> Result<Option<CheckoutResult>, ApiError> {
        let path = format!("/order/cart/{}/checkout", cart_id);
        let value = self
            .call(Method::POST, &path, &[], to_body(request)?, token)
            .await?;
        Ok(value
            .filter(|v| !v.is_null())
            .map(|v| CheckoutResult::from_value(&v)))
    }
}

// =============================================================================
// PUBLIC CATALOG
// =============================================================================

/// A plan listed in the public eco catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPlan {
    pub plan_code: String,
    #[serde(default)]
    pub invoice_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    plans: Vec<CatalogPlan>,
}

/// Lists the eco server plans sold in `zone`. Unauthenticated; used to pick a plan code.
#[instrument]
pub async fn fetch_catalog(endpoint: &str, zone: &str) -> Result<Vec<CatalogPlan>, ApiError> {
    let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!("{}/v1/order/catalog/public/eco", base_url(endpoint));
    let response = http
        .get(url)
        .query(&[("ovhSubsidiary", zone)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let catalog: Catalog = response.json().await?;
    Ok(catalog.plans)
}
