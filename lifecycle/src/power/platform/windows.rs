use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PowerCommand, PowerPlatform, ShutdownRequest};
use crate::errors::PowerResult;
use crate::power::ReasonFlags;
use crate::process;

const PRIVILEGE_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Power control through `shutdown.exe`.
///
/// Reason codes are passed with `/d [p|u]:major:minor`, which the OS records
/// with the same values the native shutdown API takes.
pub struct WindowsPower {
    command_timeout: Duration,
}

impl WindowsPower {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    fn request_command(request: &ShutdownRequest) -> PowerCommand {
        let mode = if request.reboot { "/r" } else { "/s" };
        let prefix = if request.reason.flags.contains(ReasonFlags::PLANNED) {
            "p:"
        } else if request.reason.flags.contains(ReasonFlags::USER_DEFINED) {
            "u:"
        } else {
            ""
        };

        let mut args = vec![
            mode.to_string(),
            "/t".to_string(),
            request.timeout_secs.to_string(),
            "/d".to_string(),
            format!(
                "{}{}:{}",
                prefix,
                request.reason.major_code(),
                request.reason.minor_code()
            ),
        ];
        if !request.message.is_empty() {
            args.push("/c".to_string());
            args.push(request.message.clone());
        }
        if request.force {
            args.push("/f".to_string());
        }
        PowerCommand::new("shutdown", args)
    }
}

#[async_trait]
impl PowerPlatform for WindowsPower {
    async fn log_off(&self, timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout("shutdown", &["/l".into()], timeout).await
    }

    async fn hibernate(&self, timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout("shutdown", &["/h".into()], timeout).await
    }

    async fn lock(&self) -> PowerResult<()> {
        process::spawn_detached("rundll32.exe", &["user32.dll,LockWorkStation".into()])
    }

    async fn request_shutdown(&self, request: &ShutdownRequest) -> PowerResult<i32> {
        let command = Self::request_command(request);
        process::run_with_timeout(&command.program, &command.args, self.command_timeout).await
    }

    async fn elevate_privilege(&self, name: &str) -> bool {
        // shutdown.exe enables the privilege itself; what matters is whether
        // the token holds it at all.
        match process::run_capture("whoami", &["/priv".into()], PRIVILEGE_QUERY_TIMEOUT).await {
            Ok((0, output)) => {
                let held = output.lines().any(|line| line.trim_start().starts_with(name));
                debug!("Privilege '{}' held by process token: {}", name, held);
                held
            }
            Ok((code, _)) => {
                warn!("Privilege query exited with code {}", code);
                false
            }
            Err(e) => {
                warn!("Privilege query failed: {}", e);
                false
            }
        }
    }

    async fn spawn_command(&self, program: &str, args: &[String], timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout(program, args, timeout).await
    }

    fn shutdown_command(&self, reboot: bool, comment: &str) -> PowerCommand {
        let mode = if reboot { "/r" } else { "/s" };
        PowerCommand::new(
            "shutdown",
            vec![
                mode.to_string(),
                "/c".to_string(),
                comment.to_string(),
                "/t".to_string(),
                "0".to_string(),
            ],
        )
    }
}
