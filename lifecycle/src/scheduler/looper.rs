//! The round loop behind a running [`super::ModuleScheduler`]

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{LoopExit, SchedulerTimings, ServiceHooks};
use crate::constants::scheduler;
use crate::errors::LifecycleError;
use crate::module::Module;
use crate::response::Response;
use crate::state::PowerState;

/// The loop body, owned by the worker task.
pub(crate) struct Looper {
    pub(crate) service: String,
    pub(crate) modules: Vec<Arc<dyn Module>>,
    pub(crate) hooks: Arc<dyn ServiceHooks>,
    pub(crate) state: Arc<PowerState>,
    pub(crate) timings: SchedulerTimings,
    pub(crate) cancel: CancellationToken,
    pub(crate) client_info: String,
}

impl Looper {
    pub(crate) async fn run(self) -> LoopExit {
        info!("{} loop started with {} module(s)", self.service, self.modules.len());
        let mut round: u64 = 0;

        loop {
            if self.state.should_stop() {
                info!("{} loop exiting: power transition in progress", self.service);
                return LoopExit::PowerTransition;
            }
            if self.cancel.is_cancelled() {
                return LoopExit::Cancelled;
            }

            round += 1;
            let data = match self.hooks.loop_data().await {
                Some(data) => data,
                None => {
                    debug!("{} round {}: no loop data, using empty payload", self.service, round);
                    Response::new()
                }
            };

            self.run_round(round, &data).await;

            if self.cancel.is_cancelled() {
                return LoopExit::Cancelled;
            }

            while self.state.is_requested() {
                info!(
                    "{} round {}: power operation requested, checking again in {}s",
                    self.service,
                    round,
                    self.timings.requested_recheck.as_secs()
                );
                if self.sleep(self.timings.requested_recheck).await {
                    return LoopExit::Cancelled;
                }
            }

            if self.state.should_stop() {
                info!("{} loop exiting after round {}: power transition in progress", self.service, round);
                return LoopExit::PowerTransition;
            }

            let interval = self.next_interval().await;
            debug!("{} round {} done, sleeping {}s", self.service, round, interval.as_secs());
            if self.sleep(interval).await {
                return LoopExit::Cancelled;
            }
        }
    }

    /// Run every module once, in order. Returns how many were started.
    pub(crate) async fn run_round(&self, round: u64, data: &Response) -> usize {
        let mut started = 0;

        for module in &self.modules {
            if self.state.should_pause() {
                info!(
                    "{} round {}: power state changed, skipping remaining modules",
                    self.service, round
                );
                break;
            }
            if self.cancel.is_cancelled() {
                break;
            }

            let name = module.name();
            info!(
                module = name,
                round,
                client = %self.client_info,
                "Running module"
            );

            let payload = data.get_sub_response(name);
            let call = module.start(&payload, self.cancel.child_token());
            started += 1;

            let failure = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("{:#}", e)),
                Err(panic) => Some(format!("panicked: {}", panic_message(panic.as_ref()))),
            };
            match failure {
                None => debug!(module = name, round, "Module finished"),
                Some(reason) => {
                    let err = LifecycleError::ModuleFailure {
                        module: name.to_string(),
                        reason,
                    };
                    error!(round, "{}", err);
                }
            }
        }

        started
    }

    async fn next_interval(&self) -> Duration {
        match self.hooks.sleep_time().await {
            Some(seconds) => {
                if seconds < scheduler::MIN_SLEEP_SECONDS {
                    debug!(
                        "{} sleep time {}s is below the recommended {}s",
                        self.service,
                        seconds,
                        scheduler::MIN_SLEEP_SECONDS
                    );
                }
                Duration::from_secs(seconds)
            }
            None => self.timings.default_sleep,
        }
    }

    /// Sleep unless cancelled first. Returns `true` when cancelled.
    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<(String, Response)>>>,
    }

    #[async_trait]
    impl Module for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self, data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((self.name.to_string(), data.clone()));
            Ok(())
        }
    }

    struct Panicky;

    #[async_trait]
    impl Module for Panicky {
        fn name(&self) -> &str {
            "Panicky"
        }

        async fn start(&self, _data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
            panic!("module blew up");
        }
    }

    struct NoHooks;

    #[async_trait]
    impl ServiceHooks for NoHooks {
        fn server_address(&self) -> Option<String> {
            Some("http://localhost".to_string())
        }

        async fn loop_data(&self) -> Option<Response> {
            None
        }

        async fn sleep_time(&self) -> Option<u64> {
            None
        }
    }

    fn looper(modules: Vec<Arc<dyn Module>>, state: Arc<PowerState>) -> Looper {
        Looper {
            service: "Test".to_string(),
            modules,
            hooks: Arc::new(NoHooks),
            state,
            timings: SchedulerTimings::default(),
            cancel: CancellationToken::new(),
            client_info: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_panic_does_not_stop_round() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let modules: Vec<Arc<dyn Module>> = vec![
            Arc::new(Panicky),
            Arc::new(Recorder {
                name: "After",
                seen: seen.clone(),
            }),
        ];

        let started = looper(modules, Arc::new(PowerState::new()))
            .run_round(1, &Response::new())
            .await;

        assert_eq!(started, 2);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_module_receives_its_slice_by_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let modules: Vec<Arc<dyn Module>> = vec![Arc::new(Recorder {
            name: "Snapins",
            seen: seen.clone(),
        })];
        let data = Response::from_value(json!({
            "SNAPINS": {"count": 2},
            "other": {"count": 9}
        }));

        looper(modules, Arc::new(PowerState::new()))
            .run_round(1, &data)
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, Response::from_value(json!({"count": 2})));
    }

    #[tokio::test]
    async fn test_cancelled_looper_starts_nothing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let modules: Vec<Arc<dyn Module>> = vec![Arc::new(Recorder {
            name: "A",
            seen: seen.clone(),
        })];
        let looper = looper(modules, Arc::new(PowerState::new()));
        looper.cancel.cancel();

        assert_eq!(looper.run_round(1, &Response::new()).await, 0);
        assert_eq!(looper.run().await, LoopExit::Cancelled);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
