//! Lifecycle core for an unattended client agent.
//!
//! Two pieces live here:
//! - [`ModuleScheduler`] runs registered [`Module`]s in rounds, gated by the
//!   shared [`PowerState`] flags.
//! - [`PowerOrchestrator`] performs power transitions, escalating from graceful
//!   to forced shutdown requests and finally to an unbounded safety net.

pub mod constants;
pub mod errors;
pub mod module;
pub mod power;
pub mod process;
pub mod response;
pub mod scheduler;
pub mod state;

// Re-export commonly used types
pub use errors::{LifecycleError, PowerError};
pub use module::Module;
pub use power::{
    create_platform, PowerAction, PowerEvent, PowerOrchestrator, PowerOutcome, PowerPlatform,
    PowerTimings, PrivilegeElevator, ShutdownAttempt, ShutdownReason, Tier,
};
pub use response::Response;
pub use scheduler::{LoopExit, ModuleScheduler, SchedulerTimings, ServiceHooks};
pub use state::{PowerState, PowerStateSnapshot};
