//! One task run: scan, purchase on a hit, notify.
//!
//! Every step error is caught here and turned into a [`RunOutcome`]; nothing fallible
//! crosses the run boundary.

use crate::api::OrderApi;
use crate::cancel::CancellationToken;
use crate::events::EventLog;
use crate::model::{
    CheckoutResult, Credentials, LogEvent, PipelineOptions, Selection, TaskSpec, TelegramConfig,
};
use crate::notify::{NotificationSink, Notifier};
use crate::pipeline::{OrderPipeline, PipelineError};
use crate::scanner::AvailabilityScanner;
use tokio::sync::mpsc;
use tracing::{info, instrument};

// =============================================================================
// Request / Report
// =============================================================================

/// Everything a single run needs. Consumed by `start`.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub credentials: Credentials,
    pub spec: TaskSpec,
    pub telegram: Option<TelegramConfig>,
    pub options: PipelineOptions,
    pub events: Option<mpsc::UnboundedSender<LogEvent>>,
}

impl RunRequest {
    pub fn new(credentials: Credentials, spec: TaskSpec) -> Self {
        Self {
            credentials,
            spec,
            telegram: None,
            options: PipelineOptions::default(),
            events: None,
        }
    }

    pub fn with_telegram(mut self, telegram: TelegramConfig) -> Self {
        self.telegram = Some(telegram);
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Streams every log line to `events` as it is emitted.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<LogEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

/// How a run ended. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(CheckoutResult),
    /// Nothing was in stock. Not an error.
    NotFound,
    Failed(String),
    Cancelled,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: u64,
    pub outcome: RunOutcome,
    /// The run's full operator log, in emission order.
    pub events: Vec<LogEvent>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }
}

// =============================================================================
// Execution
// =============================================================================

#[instrument(skip_all, fields(plan_code = %request.spec.plan_code, zone = %request.spec.zone))]
pub(crate) async fn execute(
    api: &dyn OrderApi,
    notifier: &dyn Notifier,
    request: &RunRequest,
    token: &CancellationToken,
    log: &EventLog,
) -> RunOutcome {
    let sink = NotificationSink::new(notifier, request.telegram.as_ref(), log);
    log.info("Starting purchase task...");

    let outcome = match purchase(api, &sink, request, token, log).await {
        Ok(Some((selection, result))) => {
            let message = format!(
                "{}: order {} created and submitted!\nServer: {}\nDatacenter: {}\nOrder URL: {}",
                request.spec.iam,
                result.order_id_or_marker(),
                selection.fqn,
                selection.datacenter,
                result.url_or_marker()
            );
            sink.notify(&message, token).await;
            RunOutcome::Completed(result)
        }
        Ok(None) => RunOutcome::NotFound,
        Err(PipelineError::Cancelled) => RunOutcome::Cancelled,
        Err(e) => {
            log.error(format!("Error while executing task: {}", e));
            sink.notify(
                &format!("{}: operation failed - {}", request.spec.iam, e),
                token,
            )
            .await;
            RunOutcome::Failed(e.to_string())
        }
    };

    match &outcome {
        RunOutcome::Completed(_) => log.success("Task completed successfully!"),
        RunOutcome::Cancelled => log.info("Task manually stopped"),
        RunOutcome::NotFound | RunOutcome::Failed(_) => {
            log.warning("Task did not complete successfully")
        }
    }
    info!(?outcome, "run finished");
    outcome
}

async fn purchase(
    api: &dyn OrderApi,
    sink: &NotificationSink<'_>,
    request: &RunRequest,
    token: &CancellationToken,
    log: &EventLog,
) -> Result<Option<(Selection, CheckoutResult)>, PipelineError> {
    let spec = &request.spec;
    if token.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    log.info(format!(
        "Checking availability of plan code {}...",
        spec.plan_code
    ));
    let selection = match AvailabilityScanner::new(api, log)
        .scan(&spec.plan_code, token)
        .await?
    {
        Some(selection) => selection,
        None => return Ok(None),
    };

    if token.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    sink.notify(
        &format!(
            "{}: found {} ({}) available in {}",
            spec.iam, spec.plan_code, selection.fqn, selection.datacenter
        ),
        token,
    )
    .await;

    let result = OrderPipeline::new(api, spec, request.options, log, token)
        .run(&selection)
        .await?;
    Ok(Some((selection, result)))
}
