//! In-memory [`Notifier`] that records every message it is asked to send.

use super::{Notifier, NotifyError};
use crate::cancel::CancellationToken;
use crate::model::TelegramConfig;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<NotifyError>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records messages but answers the first send with `error`.
    pub fn failing(error: NotifyError) -> Self {
        Self {
            messages: Arc::default(),
            failure: Arc::new(Mutex::new(Some(error))),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(
        &self,
        _config: &TelegramConfig,
        text: &str,
        _token: &CancellationToken,
    ) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
