//! Timing constants and fixed values for the scheduler and power orchestrator
//!
//! Grouped by the component that consumes them. Durations are the production
//! defaults; both components accept overrides through their timing structs.

use std::time::Duration;

/// Module scheduler constants
pub mod scheduler {
    use super::Duration;

    /// Sleep between rounds when the sleep-time hook supplies nothing
    pub const DEFAULT_SLEEP_SECONDS: u64 = 60;

    /// Recommended lower bound for a configured sleep time.
    ///
    /// Only used to warn about short intervals; never applied to the value
    /// returned by the sleep-time hook.
    pub const MIN_SLEEP_SECONDS: u64 = 30;

    /// Re-check period while a power operation is being requested
    pub const REQUESTED_RECHECK: Duration = Duration::from_secs(30);

    /// Name used in log lines when the host does not provide one
    pub const DEFAULT_SERVICE_NAME: &str = "Service";
}

/// Power orchestrator constants
pub mod power {
    use super::Duration;

    /// Non-forced shutdown requests before escalating
    pub const GRACEFUL_ATTEMPTS: u32 = 6;

    /// Forced shutdown requests before entering the safety net
    pub const FORCED_ATTEMPTS: u32 = 3;

    /// Wait after every graceful/forced request, whatever the call returned
    pub const ATTEMPT_WAIT: Duration = Duration::from_secs(5 * 60);

    /// Upper bound on waiting for a spawned power command to exit
    pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

    /// Pause between safety-net re-issues
    pub const SAFETY_NET_INTERVAL: Duration = Duration::from_secs(5 * 60);

    /// Countdown passed with every shutdown request (no dialog, not abortable)
    pub const COUNTDOWN_SECONDS: u32 = 0;

    /// Privilege required to power off the machine
    pub const SHUTDOWN_PRIVILEGE: &str = "SeShutdownPrivilege";
}
