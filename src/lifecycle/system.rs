use crate::api::{OrderApi, OvhClient};
use crate::controller::{self, Connect, TaskController};
use crate::notify::{Notifier, NotifyError, TelegramNotifier};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawns the controller actor and hands out its client.
///
/// # Example
///
/// ```ignore
/// let system = SniperSystem::with_defaults()?;
/// let report = system.controller.start(config.into_request()).await?;
/// system.shutdown().await?;
/// ```
pub struct SniperSystem {
    pub controller: TaskController,
    handle: JoinHandle<()>,
}

impl SniperSystem {
    /// Must be called from within a Tokio runtime.
    pub fn new(connect: Connect, notifier: Arc<dyn Notifier>) -> Self {
        let (actor, controller) = controller::new(connect, notifier);
        let handle = tokio::spawn(actor.run());
        Self { controller, handle }
    }

    /// Production wiring: live OVH client per run, Telegram Bot API notifier.
    pub fn with_defaults() -> Result<Self, NotifyError> {
        let notifier = Arc::new(TelegramNotifier::new()?);
        let connect: Connect = Box::new(|credentials| {
            let client: Arc<dyn OrderApi> = Arc::new(OvhClient::new(credentials.clone())?);
            Ok(client)
        });
        Ok(Self::new(connect, notifier))
    }

    /// Drops the controller handle and waits for the actor to exit. A run still in
    /// flight is cancelled by the actor on its way out.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // Closing the last sender ends the actor's receive loop.
        drop(self.controller);

        if let Err(e) = self.handle.await {
            error!("Controller task failed: {:?}", e);
            return Err(format!("Controller task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
