use super::actor::{TaskRequest, TaskStatus};
use super::run::{RunReport, RunRequest};
use super::ControlError;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

/// Handle to the controller actor. Cheap to clone; the actor stops once every handle
/// is dropped.
#[derive(Clone)]
pub struct TaskController {
    sender: mpsc::Sender<TaskRequest>,
}

impl TaskController {
    pub(super) fn new(sender: mpsc::Sender<TaskRequest>) -> Self {
        Self { sender }
    }

    /// Starts a run and waits for it to conclude.
    ///
    /// Fails with [`ControlError::AlreadyRunning`] if another run is active. Any run-level
    /// failure is reported in the [`RunReport`], never as an `Err`.
    #[instrument(skip_all, fields(plan_code = %request.spec.plan_code))]
    pub async fn start(&self, request: RunRequest) -> Result<RunReport, ControlError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TaskRequest::Start {
                request,
                respond_to,
            })
            .await
            .map_err(|_| ControlError::ActorClosed)?;
        response.await.map_err(|_| ControlError::ActorDropped)?
    }

    /// Cancels the active run. Returns `false` if nothing was running.
    pub async fn stop(&self) -> Result<bool, ControlError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TaskRequest::Stop { respond_to })
            .await
            .map_err(|_| ControlError::ActorClosed)?;
        response.await.map_err(|_| ControlError::ActorDropped)?
    }

    pub async fn status(&self) -> Result<TaskStatus, ControlError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TaskRequest::Status { respond_to })
            .await
            .map_err(|_| ControlError::ActorClosed)?;
        response.await.map_err(|_| ControlError::ActorDropped)?
    }
}
