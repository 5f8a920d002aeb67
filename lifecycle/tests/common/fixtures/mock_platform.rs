//! Power platform that records calls instead of touching the machine
//!
//! The machine never goes down, so every shutdown request "fails" and the
//! orchestrator keeps escalating. Tests unwind it with `abort()`.

use async_trait::async_trait;
use lifecycle::errors::PowerResult;
use lifecycle::power::{PowerCommand, PowerPlatform, ShutdownRequest};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    LogOff,
    Hibernate,
    Lock,
    RequestShutdown(ShutdownRequest),
    ElevatePrivilege(String),
    SpawnCommand(String, Vec<String>),
}

pub struct MockPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    grant_privilege: bool,
    hang: bool,
    /// Signalled after every `request_shutdown`
    pub requested: Notify,
    /// Signalled after every `spawn_command` (safety net)
    pub spawned: Notify,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            grant_privilege: true,
            hang: false,
            requested: Notify::new(),
            spawned: Notify::new(),
        }
    }

    pub fn refusing_privilege() -> Self {
        Self {
            grant_privilege: false,
            ..Self::new()
        }
    }

    /// Log off, hibernate and shutdown requests never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shutdown_requests(&self) -> Vec<ShutdownRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::RequestShutdown(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn spawn_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::SpawnCommand(..)))
            .count()
    }

    pub fn elevation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PlatformCall::ElevatePrivilege(_)))
            .count()
    }

    fn push(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PowerPlatform for MockPlatform {
    async fn log_off(&self, _timeout: Duration) -> PowerResult<i32> {
        self.push(PlatformCall::LogOff);
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(0)
    }

    async fn hibernate(&self, _timeout: Duration) -> PowerResult<i32> {
        self.push(PlatformCall::Hibernate);
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(0)
    }

    async fn lock(&self) -> PowerResult<()> {
        self.push(PlatformCall::Lock);
        Ok(())
    }

    async fn request_shutdown(&self, request: &ShutdownRequest) -> PowerResult<i32> {
        self.push(PlatformCall::RequestShutdown(request.clone()));
        self.requested.notify_one();
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(0)
    }

    async fn elevate_privilege(&self, name: &str) -> bool {
        self.push(PlatformCall::ElevatePrivilege(name.to_string()));
        self.grant_privilege
    }

    async fn spawn_command(&self, program: &str, args: &[String], _timeout: Duration) -> PowerResult<i32> {
        self.push(PlatformCall::SpawnCommand(program.to_string(), args.to_vec()));
        self.spawned.notify_one();
        Ok(0)
    }

    fn shutdown_command(&self, reboot: bool, comment: &str) -> PowerCommand {
        let mode = if reboot { "-r" } else { "-h" };
        PowerCommand::new(
            "shutdown",
            vec![mode.to_string(), "now".to_string(), comment.to_string()],
        )
    }
}
