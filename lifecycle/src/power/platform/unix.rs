use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{PowerCommand, PowerPlatform, ShutdownRequest};
use crate::errors::PowerResult;
use crate::process;

/// systemd/logind based power control.
///
/// There are no reason codes on this platform; the code is appended to the
/// wall message so it still shows up in the journal. Forced requests map to
/// `systemctl --force`, which skips the orderly stop of running services.
pub struct UnixPower {
    command_timeout: Duration,
}

impl UnixPower {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    fn request_command(request: &ShutdownRequest) -> PowerCommand {
        let message = if request.message.is_empty() {
            format!("reason {}", request.reason)
        } else {
            format!("{} (reason {})", request.message, request.reason)
        };

        if request.timeout_secs > 0 {
            let minutes = request.timeout_secs.div_ceil(60);
            let mode = if request.reboot { "-r" } else { "-h" };
            return PowerCommand::new(
                "shutdown",
                vec![mode.to_string(), format!("+{}", minutes), message],
            );
        }

        let verb = if request.reboot { "reboot" } else { "poweroff" };
        let mut args = vec![verb.to_string(), format!("--message={}", message)];
        if request.force {
            args.push("--force".to_string());
        }
        PowerCommand::new("systemctl", args)
    }
}

#[async_trait]
impl PowerPlatform for UnixPower {
    async fn log_off(&self, timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout("loginctl", &["terminate-seat".into(), "seat0".into()], timeout).await
    }

    async fn hibernate(&self, timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout("systemctl", &["hibernate".into()], timeout).await
    }

    async fn lock(&self) -> PowerResult<()> {
        process::spawn_detached("loginctl", &["lock-sessions".into()])
    }

    async fn request_shutdown(&self, request: &ShutdownRequest) -> PowerResult<i32> {
        let command = Self::request_command(request);
        process::run_with_timeout(&command.program, &command.args, self.command_timeout).await
    }

    async fn elevate_privilege(&self, name: &str) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        debug!("Privilege '{}' requested, effective uid is {}", name, euid);
        euid == 0
    }

    async fn spawn_command(&self, program: &str, args: &[String], timeout: Duration) -> PowerResult<i32> {
        process::run_with_timeout(program, args, timeout).await
    }

    fn shutdown_command(&self, reboot: bool, comment: &str) -> PowerCommand {
        let mode = if reboot { "-r" } else { "-h" };
        let mut args = vec![mode.to_string(), "now".to_string()];
        if !comment.is_empty() {
            args.push(comment.to_string());
        }
        PowerCommand::new("shutdown", args)
    }
}
