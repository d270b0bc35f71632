//! # Run Event Log
//!
//! Every component writes operator-facing lines through an [`EventLog`]. Each line is:
//!
//! - appended to the run's in-memory log (returned with the run report),
//! - forwarded to an optional live subscriber channel (the CLI prints from it),
//! - mirrored to `tracing` so `RUST_LOG` output and the event stream agree.
//!
//! A run has a single producer, so emission order is the order the steps executed.

use crate::model::{LogEvent, Severity};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LogEvent>>>,
    subscriber: Option<mpsc::UnboundedSender<LogEvent>>,
}

impl EventLog {
    pub fn new(subscriber: Option<mpsc::UnboundedSender<LogEvent>>) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            subscriber,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Severity::Success, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message.into());
    }

    /// Copy of everything emitted so far, in emission order.
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit(&self, severity: Severity, message: String) {
        match severity {
            Severity::Info => info!(target: "sniper", "{}", message),
            Severity::Success => info!(target: "sniper", success = true, "{}", message),
            Severity::Warning => warn!(target: "sniper", "{}", message),
            Severity::Error => error!(target: "sniper", "{}", message),
        }

        let event = LogEvent::now(severity, message);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        if let Some(subscriber) = &self.subscriber {
            // A reader that went away must not disturb the run.
            let _ = subscriber.send(event);
        }
    }
}
