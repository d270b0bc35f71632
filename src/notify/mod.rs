//! # Notifications
//!
//! Status messages mirrored to a Telegram chat. Delivery is best effort: the
//! [`NotificationSink`] swallows every failure after logging it, so a dead bot can never
//! change the outcome of a purchase.

pub mod error;
pub mod mock;
pub mod telegram;

pub use error::*;
pub use telegram::*;

use crate::cancel::CancellationToken;
use crate::events::EventLog;
use crate::model::TelegramConfig;
use async_trait::async_trait;
use tracing::debug;

/// Transport for a single chat message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(
        &self,
        config: &TelegramConfig,
        text: &str,
        token: &CancellationToken,
    ) -> Result<(), NotifyError>;
}

/// Gatekeeper in front of a [`Notifier`] for one run.
pub struct NotificationSink<'a> {
    notifier: &'a dyn Notifier,
    config: Option<&'a TelegramConfig>,
    log: &'a EventLog,
}

impl<'a> NotificationSink<'a> {
    pub fn new(
        notifier: &'a dyn Notifier,
        config: Option<&'a TelegramConfig>,
        log: &'a EventLog,
    ) -> Self {
        Self {
            notifier,
            config,
            log,
        }
    }

    /// Sends `text` if notifications are configured. Never fails.
    pub async fn notify(&self, text: &str, token: &CancellationToken) {
        let config = match self.config {
            Some(config) if config.is_usable() => config,
            _ => return,
        };

        match self.notifier.send_message(config, text, token).await {
            Ok(()) => self.log.info("Message sent to Telegram"),
            Err(NotifyError::Cancelled) => debug!("notification aborted by stop request"),
            Err(e) => self.log.error(format!("Failed to send Telegram message: {}", e)),
        }
    }
}
