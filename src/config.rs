//! # Saved Configuration
//!
//! The JSON bundle operators keep on disk:
//!
//! ```json
//! {
//!   "ovhConfig":      { "appKey": "...", "appSecret": "...", "consumerKey": "...", "endpoint": "eu.api.ovh.com" },
//!   "taskConfig":     { "iam": "box-1", "zone": "IE", "planCode": "24ska01", "os": "none_64.en", "duration": "P1M", "options": [] },
//!   "telegramConfig": { "token": "...", "chatId": "...", "enabled": true },
//!   "pipeline":       { "attachOptions": false }
//! }
//! ```
//!
//! `telegramConfig` and `pipeline` are optional. The bundle is read once at start-up and
//! never written back.

use crate::controller::RunRequest;
use crate::model::{Credentials, PipelineOptions, TaskSpec, TelegramConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfig {
    pub ovh_config: Credentials,
    pub task_config: TaskSpec,
    #[serde(default)]
    pub telegram_config: Option<TelegramConfig>,
    #[serde(default)]
    pub pipeline: PipelineOptions,
}

impl SavedConfig {
    /// Reads and validates a bundle from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SavedConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Rejects bundles that could never produce a successful order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("ovhConfig.endpoint", &self.ovh_config.endpoint),
            ("ovhConfig.appKey", &self.ovh_config.app_key),
            ("ovhConfig.consumerKey", &self.ovh_config.consumer_key),
            ("taskConfig.planCode", &self.task_config.plan_code),
            ("taskConfig.zone", &self.task_config.zone),
            ("taskConfig.os", &self.task_config.os),
            ("taskConfig.duration", &self.task_config.duration),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Missing(name)),
            None => Ok(()),
        }
    }

    pub fn into_request(self) -> RunRequest {
        let request =
            RunRequest::new(self.ovh_config, self.task_config).with_options(self.pipeline);
        match self.telegram_config {
            Some(telegram) => request.with_telegram(telegram),
            None => request,
        }
    }
}
