//! Spawning OS commands with a bounded wait
//!
//! Power commands are fire-and-wait: the caller waits at most `timeout` for the
//! process to exit and then moves on. A process still running after the
//! timeout is left alone, since a shutdown command that blocks is usually
//! busy shutting the machine down.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

use crate::errors::{PowerError, PowerResult};

/// Run `program` and return its exit code (`-1` when killed by a signal).
pub async fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> PowerResult<i32> {
    debug!("Executing command: {} {}", program, args.join(" "));

    let mut child = AsyncCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| PowerError::ProcessSpawnFailure {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let exit_code = status.code().unwrap_or(-1);
            debug!("{} exited with code {}", program, exit_code);
            Ok(exit_code)
        }
        Ok(Err(e)) => Err(PowerError::ProcessSpawnFailure {
            program: program.to_string(),
            reason: format!("failed to wait for process: {}", e),
        }),
        Err(_) => {
            warn!("{} did not exit within {}s, no longer waiting", program, timeout.as_secs());
            Err(PowerError::ProcessTimeout {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            })
        }
    }
}

/// Run `program` and capture stdout. The process is killed if it outlives `timeout`.
pub async fn run_capture(program: &str, args: &[String], timeout: Duration) -> PowerResult<(i32, String)> {
    debug!("Executing command: {} {}", program, args.join(" "));

    let output = AsyncCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, output).await {
        Ok(Ok(result)) => {
            let stdout = String::from_utf8_lossy(&result.stdout).to_string();
            Ok((result.status.code().unwrap_or(-1), stdout))
        }
        Ok(Err(e)) => Err(PowerError::ProcessSpawnFailure {
            program: program.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(PowerError::ProcessTimeout {
            program: program.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Launch `program` without waiting for it.
pub fn spawn_detached(program: &str, args: &[String]) -> PowerResult<()> {
    debug!("Launching detached command: {} {}", program, args.join(" "));

    AsyncCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| PowerError::ProcessSpawnFailure {
            program: program.to_string(),
            reason: e.to_string(),
        })
}
