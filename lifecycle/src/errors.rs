//! Error types for the lifecycle core
//!
//! Only start-up problems reach a caller. Everything that goes wrong once the
//! scheduler loop or a power sequence is running is logged and recovered.

/// Scheduler lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A prerequisite for starting is absent
    #[error("configuration missing: {field}")]
    ConfigurationMissing { field: String },

    /// A module returned an error or panicked
    #[error("module '{module}' failed: {reason}")]
    ModuleFailure { module: String, reason: String },

    /// `start()` called while the loop is already running
    #[error("scheduler '{name}' is already running")]
    AlreadyRunning { name: String },
}

/// Power subsystem errors
#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    /// The named privilege could not be enabled for this process
    #[error("failed to enable privilege '{privilege}'")]
    ElevationFailure { privilege: String },

    /// An OS command could not be launched
    #[error("failed to launch '{program}': {reason}")]
    ProcessSpawnFailure { program: String, reason: String },

    /// An OS command was launched but did not exit in time
    #[error("'{program}' still running after {timeout_secs}s")]
    ProcessTimeout { program: String, timeout_secs: u64 },
}

/// Convenience result type for the power subsystem.
pub type PowerResult<T> = std::result::Result<T, PowerError>;
