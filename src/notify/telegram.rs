use super::{Notifier, NotifyError};
use crate::cancel::{abortable, CancellationToken};
use crate::model::TelegramConfig;
use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Bot API `sendMessage` over HTTPS.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new() -> Result<Self, NotifyError> {
        Self::with_api_base(TELEGRAM_API)
    }

    /// Points the notifier at another Bot API host (self-hosted bot server, test double).
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn send_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all, fields(chat_id = %config.chat_id))]
    async fn send_message(
        &self,
        config: &TelegramConfig,
        text: &str,
        token: &CancellationToken,
    ) -> Result<(), NotifyError> {
        let request = self.http.post(self.send_url(&config.token)).json(&SendMessage {
            chat_id: &config.chat_id,
            text,
        });

        abortable(token, deliver(request)).await
    }
}

async fn deliver(request: reqwest::RequestBuilder) -> Result<(), NotifyError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
