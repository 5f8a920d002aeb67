//! OS power primitives behind one trait.
//!
//! Windows issues reason-coded requests through `shutdown.exe` and checks the
//! process token for the shutdown privilege. Unix hosts go through systemd and
//! treat "running as root" as holding the privilege.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::reason::ShutdownReason;
use crate::constants::power;
use crate::errors::PowerResult;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

/// Parameters of a single reason-coded shutdown/reboot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownRequest {
    pub message: String,
    /// Countdown before the OS acts; 0 means immediately
    pub timeout_secs: u32,
    /// Close applications even with unsaved state
    pub force: bool,
    pub reboot: bool,
    pub reason: ShutdownReason,
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PowerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for PowerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait PowerPlatform: Send + Sync {
    /// Log off the interactive user, waiting at most `timeout`.
    async fn log_off(&self, timeout: Duration) -> PowerResult<i32>;

    /// Hibernate the machine, waiting at most `timeout`.
    async fn hibernate(&self, timeout: Duration) -> PowerResult<i32>;

    /// Lock the workstation without waiting.
    async fn lock(&self) -> PowerResult<()>;

    /// Issue a reason-coded shutdown/reboot request and return the OS result
    /// code. A zero code does not prove the machine will go down.
    async fn request_shutdown(&self, request: &ShutdownRequest) -> PowerResult<i32>;

    /// Enable a named privilege for this process. `true` when held afterwards.
    async fn elevate_privilege(&self, name: &str) -> bool;

    /// Run a command, waiting at most `timeout`, and return its exit code.
    async fn spawn_command(&self, program: &str, args: &[String], timeout: Duration) -> PowerResult<i32>;

    /// The plain, unprivileged shutdown/reboot command used by the safety net.
    fn shutdown_command(&self, reboot: bool, comment: &str) -> PowerCommand;
}

/// Create the power platform for the current OS.
pub fn create_platform() -> Arc<dyn PowerPlatform> {
    let command_timeout = power::COMMAND_TIMEOUT;
    #[cfg(windows)]
    {
        Arc::new(windows::WindowsPower::new(command_timeout))
    }
    #[cfg(unix)]
    {
        Arc::new(unix::UnixPower::new(command_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_joins_arguments() {
        let command = PowerCommand::new("shutdown", vec!["-r".into(), "now".into()]);
        assert_eq!(command.to_string(), "shutdown -r now");
    }

    #[test]
    fn test_platform_builds_distinct_basic_commands() {
        let platform = create_platform();
        let shutdown = platform.shutdown_command(false, "maint");
        let reboot = platform.shutdown_command(true, "maint");
        assert_eq!(shutdown.program, "shutdown");
        assert_ne!(shutdown, reboot);
        assert!(reboot.args.iter().any(|a| a.contains("maint")));
    }
}
