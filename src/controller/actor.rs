//! The controller's server half: a single task that owns the active-run guard.

use super::run::{self, RunOutcome, RunReport, RunRequest};
use super::ControlError;
use crate::api::{ApiError, OrderApi};
use crate::cancel::CancellationToken;
use crate::events::EventLog;
use crate::model::Credentials;
use crate::notify::Notifier;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Builds the order API client for a run's credentials.
pub type Connect =
    Box<dyn Fn(&Credentials) -> Result<Arc<dyn OrderApi>, ApiError> + Send + Sync>;

pub type Response<T> = oneshot::Sender<Result<T, ControlError>>;

// =============================================================================
// Messages
// =============================================================================

pub enum TaskRequest {
    Start {
        request: RunRequest,
        respond_to: Response<RunReport>,
    },
    Stop {
        respond_to: Response<bool>,
    },
    Status {
        respond_to: Response<TaskStatus>,
    },
    /// Sent by a run task before it answers its caller.
    Finished { run_id: u64, outcome: RunOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Running { run_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub activity: Activity,
    pub last_outcome: Option<RunOutcome>,
}

impl TaskStatus {
    pub fn is_running(&self) -> bool {
        matches!(self.activity, Activity::Running { .. })
    }
}

struct ActiveRun {
    run_id: u64,
    token: CancellationToken,
}

// =============================================================================
// Actor
// =============================================================================

/// Processes `Start`, `Stop` and `Status` sequentially. Runs execute in their own
/// spawned task, so `Stop` is handled while a run is suspended on the network.
pub struct TaskActor {
    receiver: mpsc::Receiver<TaskRequest>,
    sender: mpsc::WeakSender<TaskRequest>,
    connect: Arc<Connect>,
    notifier: Arc<dyn Notifier>,
    active: Option<ActiveRun>,
    last_outcome: Option<RunOutcome>,
    next_run_id: u64,
}

impl TaskActor {
    pub(super) fn new(
        receiver: mpsc::Receiver<TaskRequest>,
        sender: mpsc::WeakSender<TaskRequest>,
        connect: Connect,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            receiver,
            sender,
            connect: Arc::new(connect),
            notifier,
            active: None,
            last_outcome: None,
            next_run_id: 1,
        }
    }

    /// Runs until every [`TaskController`](super::TaskController) handle is dropped.
    /// A run still in flight at that point is cancelled.
    pub async fn run(mut self) {
        info!("Task controller started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TaskRequest::Start {
                    request,
                    respond_to,
                } => self.start(request, respond_to),
                TaskRequest::Stop { respond_to } => {
                    let stopped = match &self.active {
                        Some(active) => {
                            info!(run_id = active.run_id, "Stop requested");
                            active.token.cancel();
                            true
                        }
                        None => {
                            debug!("Stop requested while idle");
                            false
                        }
                    };
                    let _ = respond_to.send(Ok(stopped));
                }
                TaskRequest::Status { respond_to } => {
                    let activity = match &self.active {
                        Some(active) => Activity::Running {
                            run_id: active.run_id,
                        },
                        None => Activity::Idle,
                    };
                    let _ = respond_to.send(Ok(TaskStatus {
                        activity,
                        last_outcome: self.last_outcome.clone(),
                    }));
                }
                TaskRequest::Finished { run_id, outcome } => {
                    if self.active.as_ref().is_some_and(|a| a.run_id == run_id) {
                        self.active = None;
                    }
                    debug!(run_id, ?outcome, "Run finished");
                    self.last_outcome = Some(outcome);
                }
            }
        }

        if let Some(active) = self.active.take() {
            warn!(run_id = active.run_id, "Controller closing with a run in flight, cancelling");
            active.token.cancel();
        }
        info!("Task controller shutdown");
    }

    fn start(&mut self, request: RunRequest, respond_to: Response<RunReport>) {
        if let Some(active) = &self.active {
            warn!(run_id = active.run_id, "Start rejected, a run is active");
            let _ = respond_to.send(Err(ControlError::AlreadyRunning {
                run_id: active.run_id,
            }));
            return;
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        let token = CancellationToken::new();
        self.active = Some(ActiveRun {
            run_id,
            token: token.clone(),
        });
        info!(run_id, plan_code = %request.spec.plan_code, "Run started");

        let finished = self.sender.clone();
        let connect = Arc::clone(&self.connect);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let log = EventLog::new(request.events.clone());
            let outcome = match connect(&request.credentials) {
                Ok(api) => run::execute(api.as_ref(), notifier.as_ref(), &request, &token, &log).await,
                Err(e) => {
                    log.error(format!("Error while executing task: {}", e));
                    RunOutcome::Failed(e.to_string())
                }
            };

            if let Some(sender) = finished.upgrade() {
                let _ = sender
                    .send(TaskRequest::Finished {
                        run_id,
                        outcome: outcome.clone(),
                    })
                    .await;
            }
            let _ = respond_to.send(Ok(RunReport {
                run_id,
                outcome,
                events: log.snapshot(),
            }));
        });
    }
}
