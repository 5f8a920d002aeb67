//! Shared helpers for agent integration tests

#![allow(dead_code)]

use agent::AppState;
use async_trait::async_trait;
use lifecycle::errors::PowerResult;
use lifecycle::power::{PowerCommand, PowerPlatform, ShutdownRequest};
use lifecycle::{PowerOrchestrator, PowerState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-key";

/// Platform that accepts every call and never powers anything off.
#[derive(Default)]
pub struct InertPlatform {
    pub calls: AtomicUsize,
}

impl InertPlatform {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PowerPlatform for InertPlatform {
    async fn log_off(&self, _timeout: Duration) -> PowerResult<i32> {
        self.hit();
        Ok(0)
    }

    async fn hibernate(&self, _timeout: Duration) -> PowerResult<i32> {
        self.hit();
        Ok(0)
    }

    async fn lock(&self) -> PowerResult<()> {
        self.hit();
        Ok(())
    }

    async fn request_shutdown(&self, _request: &ShutdownRequest) -> PowerResult<i32> {
        self.hit();
        Ok(0)
    }

    async fn elevate_privilege(&self, _name: &str) -> bool {
        true
    }

    async fn spawn_command(&self, _program: &str, _args: &[String], _timeout: Duration) -> PowerResult<i32> {
        self.hit();
        Ok(0)
    }

    fn shutdown_command(&self, reboot: bool, _comment: &str) -> PowerCommand {
        PowerCommand::new("true", vec![reboot.to_string()])
    }
}

pub fn test_orchestrator() -> (Arc<InertPlatform>, Arc<PowerOrchestrator>) {
    let platform = Arc::new(InertPlatform::default());
    let orchestrator = Arc::new(PowerOrchestrator::new(
        platform.clone(),
        Arc::new(PowerState::new()),
    ));
    (platform, orchestrator)
}

pub fn test_app_state() -> (Arc<InertPlatform>, Arc<AppState>) {
    let (platform, orchestrator) = test_orchestrator();
    let state = Arc::new(AppState {
        api_key: TEST_API_KEY.to_string(),
        orchestrator,
    });
    (platform, state)
}
