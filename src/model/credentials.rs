use serde::{Deserialize, Serialize};
use std::fmt;

/// API identity used for every order-API request of a run.
///
/// Only the application key and the consumer key travel as headers; the secret is kept
/// for the signing layer that sits in front of the API and never leaves this struct.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: String,
    pub consumer_key: String,
    /// API host such as `eu.api.ovh.com`, or a full base URL of a signing proxy.
    pub endpoint: String,
}

impl Credentials {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        consumer_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            consumer_key: consumer_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"***")
            .field("consumer_key", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Telegram bot settings for status notifications.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    #[serde(default)]
    pub enabled: bool,
}

impl TelegramConfig {
    /// True when notifications are switched on and both the bot token and chat id are set.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .field("enabled", &self.enabled)
            .finish()
    }
}
