//! Module scheduler
//!
//! Runs a fixed list of [`Module`]s in rounds on a dedicated tokio task.
//! Every round is gated by the shared [`PowerState`]:
//!
//! - ShuttingDown or Updating ends the loop.
//! - Requested stops the current round at the next module boundary and defers
//!   the next round until it clears.
//!
//! Stopping is cooperative: [`ModuleScheduler::stop`] cancels a token that the
//! loop checks between modules and during every sleep, then waits for the task
//! to finish. A running module is never torn down mid-call.

mod looper;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::constants::scheduler;
use crate::errors::LifecycleError;
use crate::module::Module;
use crate::response::Response;
use crate::state::PowerState;
use looper::Looper;

/// Host-supplied callbacks around the loop.
#[async_trait]
pub trait ServiceHooks: Send + Sync {
    /// Endpoint the service talks to. The loop refuses to start without one.
    fn server_address(&self) -> Option<String>;

    /// Version reported alongside every module invocation.
    fn client_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Runs once before the loop is launched.
    async fn load(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs once after the loop has stopped.
    async fn unload(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Payload for the coming round. `None` is treated as empty.
    async fn loop_data(&self) -> Option<Response>;

    /// Seconds to sleep after a round. `None` uses the default.
    async fn sleep_time(&self) -> Option<u64>;
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// ShuttingDown or Updating was set
    PowerTransition,
    /// [`ModuleScheduler::stop`] was called
    Cancelled,
    /// The loop task panicked outside a module
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTimings {
    /// Sleep between rounds when the hook returns `None`
    pub default_sleep: Duration,
    /// Re-check period while Requested is set
    pub requested_recheck: Duration,
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self {
            default_sleep: Duration::from_secs(scheduler::DEFAULT_SLEEP_SECONDS),
            requested_recheck: scheduler::REQUESTED_RECHECK,
        }
    }
}

struct Worker {
    handle: JoinHandle<LoopExit>,
    cancel: CancellationToken,
}

pub struct ModuleScheduler {
    name: String,
    modules: Vec<Arc<dyn Module>>,
    hooks: Arc<dyn ServiceHooks>,
    state: Arc<PowerState>,
    timings: SchedulerTimings,
    worker: Mutex<Option<Worker>>,
}

impl ModuleScheduler {
    pub fn new(
        name: impl Into<String>,
        modules: Vec<Arc<dyn Module>>,
        hooks: Arc<dyn ServiceHooks>,
        state: Arc<PowerState>,
    ) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                scheduler::DEFAULT_SERVICE_NAME.to_string()
            } else {
                name
            },
            modules,
            hooks,
            state,
            timings: SchedulerTimings::default(),
            worker: Mutex::new(None),
        }
    }

    pub fn with_timings(mut self, timings: SchedulerTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// `true` while the loop task has not finished.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Run the load hook and launch the loop.
    ///
    /// Fails without launching when the server address is missing or a loop
    /// is already running. A failing load hook is logged and the loop still
    /// starts.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        let address = self
            .hooks
            .server_address()
            .filter(|address| !address.trim().is_empty());
        let Some(address) = address else {
            let err = LifecycleError::ConfigurationMissing {
                field: "server address".to_string(),
            };
            error!("{}: {}, not starting", self.name, err);
            return Err(err);
        };

        let mut worker = self.worker.lock().await;
        if worker
            .as_ref()
            .is_some_and(|existing| !existing.handle.is_finished())
        {
            return Err(LifecycleError::AlreadyRunning {
                name: self.name.clone(),
            });
        }

        info!(
            "{} starting against {} with modules [{}]",
            self.name,
            address,
            self.module_names().join(", ")
        );
        if let Err(e) = self.hooks.load().await {
            warn!("{} load hook failed: {:#}", self.name, e);
        }

        let cancel = CancellationToken::new();
        let looper = Looper {
            service: self.name.clone(),
            modules: self.modules.clone(),
            hooks: Arc::clone(&self.hooks),
            state: Arc::clone(&self.state),
            timings: self.timings,
            cancel: cancel.clone(),
            client_info: format!(
                "{} ({})",
                self.hooks.client_version(),
                std::env::consts::OS
            ),
        };
        let handle = tokio::spawn(looper.run());

        *worker = Some(Worker { handle, cancel });
        Ok(())
    }

    /// Signal the loop to stop, wait for it, then run the unload hook.
    ///
    /// Returns how the loop ended, or `None` if it was never started.
    pub async fn stop(&self) -> Option<LoopExit> {
        let worker = self.worker.lock().await.take()?;

        info!("{} stopping", self.name);
        worker.cancel.cancel();
        let exit = match worker.handle.await {
            Ok(exit) => exit,
            Err(e) => {
                error!("{} loop task failed: {}", self.name, e);
                LoopExit::Aborted
            }
        };

        if let Err(e) = self.hooks.unload().await {
            warn!("{} unload hook failed: {:#}", self.name, e);
        }
        info!("{} stopped ({:?})", self.name, exit);
        Some(exit)
    }
}
