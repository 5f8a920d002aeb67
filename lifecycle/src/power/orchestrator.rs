//! Power request execution and shutdown/reboot escalation

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::platform::{PowerCommand, PowerPlatform, ShutdownRequest};
use super::privilege::PrivilegeElevator;
use super::reason::ShutdownReason;
use super::{PowerAction, PowerEvent, PowerOutcome, PowerTimings, ShutdownAttempt, Tier};
use crate::constants::power;
use crate::errors::{PowerError, PowerResult};
use crate::state::PowerState;

const DEFAULT_MESSAGE: &str = "Power management";

pub struct PowerOrchestrator {
    platform: Arc<dyn PowerPlatform>,
    elevator: PrivilegeElevator,
    state: Arc<PowerState>,
    timings: PowerTimings,
    active: Mutex<Option<CancellationToken>>,
    last_attempt: Mutex<Option<ShutdownAttempt>>,
}

/// Clears the in-flight marker when a sequence unwinds.
struct SequenceGuard<'a> {
    orchestrator: &'a PowerOrchestrator,
    cancel: CancellationToken,
}

impl Drop for SequenceGuard<'_> {
    fn drop(&mut self) {
        *self
            .orchestrator
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

impl PowerOrchestrator {
    pub fn new(platform: Arc<dyn PowerPlatform>, state: Arc<PowerState>) -> Self {
        Self::with_timings(platform, state, PowerTimings::default())
    }

    pub fn with_timings(
        platform: Arc<dyn PowerPlatform>,
        state: Arc<PowerState>,
        timings: PowerTimings,
    ) -> Self {
        Self {
            elevator: PrivilegeElevator::new(Arc::clone(&platform)),
            platform,
            state,
            timings,
            active: Mutex::new(None),
            last_attempt: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<PowerState> {
        &self.state
    }

    /// The most recently issued shutdown/reboot request, if any.
    pub fn last_attempt(&self) -> Option<ShutdownAttempt> {
        self.last_attempt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_sequence_active(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Cancel the running shutdown/reboot sequence at its next wait.
    ///
    /// Returns `false` when no sequence is running. The ShuttingDown flag is
    /// left set.
    pub fn abort(&self) -> bool {
        let active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match active.as_ref() {
            Some(cancel) if !cancel.is_cancelled() => {
                warn!("Operator aborted the running power sequence");
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Run `event` on a background task.
    ///
    /// For shutdown and reboot the ShuttingDown flag is set before this
    /// returns, so a scheduler round already in progress stops at its next
    /// module boundary.
    pub fn dispatch(self: &Arc<Self>, event: PowerEvent) -> JoinHandle<PowerOutcome> {
        if event.action.is_power_cycle() {
            self.state.set_shutting_down(true);
        }
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.invoke(event).await })
    }

    /// Execute a power request.
    ///
    /// Log off, hibernate and lock are single calls. Shutdown and reboot only
    /// return when aborted or rejected as a duplicate.
    #[instrument(skip(self, event), fields(action = %event.action))]
    pub async fn invoke(&self, event: PowerEvent) -> PowerOutcome {
        info!("Power request received: {} ({})", event.action, event.comment);

        match event.action {
            PowerAction::LogOff => {
                let result = self
                    .bounded("log off", self.platform.log_off(self.timings.command_timeout))
                    .await;
                Self::single_call_outcome(event.action, result)
            }
            PowerAction::Hibernate => {
                let result = self
                    .bounded("hibernate", self.platform.hibernate(self.timings.command_timeout))
                    .await;
                Self::single_call_outcome(event.action, result)
            }
            PowerAction::Lock => match self.platform.lock().await {
                Ok(()) => {
                    info!("Workstation lock issued");
                    PowerOutcome::Issued { action: event.action }
                }
                Err(e) => {
                    error!("Failed to lock workstation: {}", e);
                    PowerOutcome::Failed {
                        action: event.action,
                        reason: e.to_string(),
                    }
                }
            },
            PowerAction::Shutdown | PowerAction::Reboot => self.escalate(&event).await,
        }
    }

    /// Await a platform call, giving up after the command timeout even if the
    /// platform does not enforce one itself.
    async fn bounded<F>(&self, program: &str, call: F) -> PowerResult<i32>
    where
        F: Future<Output = PowerResult<i32>>,
    {
        let limit = self.timings.command_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(PowerError::ProcessTimeout {
                program: program.to_string(),
                timeout_secs: limit.as_secs(),
            }),
        }
    }

    fn single_call_outcome(action: PowerAction, result: PowerResult<i32>) -> PowerOutcome {
        match result {
            Ok(0) => {
                info!("{} issued", action);
                PowerOutcome::Issued { action }
            }
            Ok(code) => {
                warn!("{} exited with code {}", action, code);
                PowerOutcome::Failed {
                    action,
                    reason: format!("exit code {}", code),
                }
            }
            Err(e) => {
                error!("{} failed: {}", action, e);
                PowerOutcome::Failed {
                    action,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn begin_sequence(&self) -> Option<SequenceGuard<'_>> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if active.is_some() {
            return None;
        }
        let cancel = CancellationToken::new();
        *active = Some(cancel.clone());
        Some(SequenceGuard {
            orchestrator: self,
            cancel,
        })
    }

    fn record(&self, attempt: ShutdownAttempt) {
        *self
            .last_attempt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(attempt);
    }

    async fn escalate(&self, event: &PowerEvent) -> PowerOutcome {
        let Some(sequence) = self.begin_sequence() else {
            warn!("A shutdown/reboot sequence is already running, ignoring {}", event.action);
            return PowerOutcome::AlreadyInProgress;
        };
        let cancel = &sequence.cancel;

        self.state.set_shutting_down(true);

        let reboot = event.action == PowerAction::Reboot;
        let basic = self.platform.shutdown_command(reboot, &event.comment);

        if !self.elevator.enable_privilege(power::SHUTDOWN_PRIVILEGE).await {
            warn!("Could not acquire shutdown privilege, using plain {} command", event.action);
            return self.safety_net(&basic, cancel).await;
        }

        let message = if event.comment.is_empty() {
            DEFAULT_MESSAGE.to_string()
        } else {
            event.comment.clone()
        };

        let graceful = ShutdownRequest {
            message,
            timeout_secs: power::COUNTDOWN_SECONDS,
            force: false,
            reboot,
            reason: ShutdownReason::planned_maintenance(),
        };
        if let Some(outcome) = self
            .run_tier(Tier::Graceful, self.timings.graceful_attempts, &graceful, cancel)
            .await
        {
            return outcome;
        }

        warn!(
            "Machine still running after {} graceful attempts, forcing applications closed",
            self.timings.graceful_attempts
        );
        let forced = ShutdownRequest {
            force: true,
            ..graceful
        };
        if let Some(outcome) = self
            .run_tier(Tier::Forced, self.timings.forced_attempts, &forced, cancel)
            .await
        {
            return outcome;
        }

        error!(
            "Machine still running after {} forced attempts, entering safety net",
            self.timings.forced_attempts
        );
        self.safety_net(&basic, cancel).await
    }

    /// Issue up to `attempts` requests, waiting after each one. The OS result
    /// code is logged but never ends the tier: policy can swallow a request
    /// that reported success.
    async fn run_tier(
        &self,
        tier: Tier,
        attempts: u32,
        request: &ShutdownRequest,
        cancel: &CancellationToken,
    ) -> Option<PowerOutcome> {
        for ordinal in 1..=attempts {
            if cancel.is_cancelled() {
                return Some(PowerOutcome::Cancelled {
                    tier,
                    attempts: ordinal - 1,
                });
            }

            self.record(ShutdownAttempt::new(tier, ordinal, request.reason));
            let call = self.platform.request_shutdown(request);
            match self.bounded("shutdown request", call).await {
                Ok(code) => info!(
                    "{} attempt {}/{} issued (reason {}, result code {})",
                    tier, ordinal, attempts, request.reason, code
                ),
                Err(e) => error!("{} attempt {}/{} failed: {}", tier, ordinal, attempts, e),
            }

            if Self::wait(self.timings.attempt_wait, cancel).await {
                return Some(PowerOutcome::Cancelled {
                    tier,
                    attempts: ordinal,
                });
            }
        }
        None
    }

    /// Re-issue the plain command forever. Only an abort returns.
    async fn safety_net(&self, command: &PowerCommand, cancel: &CancellationToken) -> PowerOutcome {
        let mut issued: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return PowerOutcome::Cancelled {
                    tier: Tier::SafetyNet,
                    attempts: issued,
                };
            }

            issued = issued.saturating_add(1);
            self.record(ShutdownAttempt::new(
                Tier::SafetyNet,
                issued,
                ShutdownReason::unspecified(),
            ));
            info!("Safety net attempt {}: {}", issued, command);

            let result = self
                .bounded(
                    &command.program,
                    self.platform.spawn_command(
                        &command.program,
                        &command.args,
                        self.timings.command_timeout,
                    ),
                )
                .await;
            match result {
                Ok(code) => debug!("Safety net command exited with code {}", code),
                Err(e) => error!("Safety net command failed: {}", e),
            }

            if Self::wait(self.timings.safety_net_interval, cancel).await {
                return PowerOutcome::Cancelled {
                    tier: Tier::SafetyNet,
                    attempts: issued,
                };
            }
        }
    }

    /// Sleep for `duration`. Returns `true` if cancelled first.
    async fn wait(duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
