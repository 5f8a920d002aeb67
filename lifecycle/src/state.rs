//! Power state flags shared between the scheduler and the orchestrator
//!
//! Three independent booleans, each behind its own atomic. Writers publish
//! with `Release`, readers observe with `Acquire`, so a flag set by the power
//! path is visible to the scheduler's next per-module check.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
pub struct PowerState {
    shutting_down: AtomicBool,
    updating: AtomicBool,
    requested: AtomicBool,
}

/// Point-in-time copy of the flags, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerStateSnapshot {
    pub shutting_down: bool,
    pub updating: bool,
    pub requested: bool,
}

impl PowerState {
    /// All flags start cleared.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    pub fn set_shutting_down(&self, value: bool) {
        debug!("PowerState: shutting_down = {}", value);
        self.shutting_down.store(value, Ordering::Release);
    }

    #[inline]
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    pub fn set_updating(&self, value: bool) {
        debug!("PowerState: updating = {}", value);
        self.updating.store(value, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub fn set_requested(&self, value: bool) {
        debug!("PowerState: requested = {}", value);
        self.requested.store(value, Ordering::Release);
    }

    /// ShuttingDown or Updating: the scheduler loop must end.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.is_shutting_down() || self.is_updating()
    }

    /// Any flag set: no further module may start this round.
    #[inline]
    pub fn should_pause(&self) -> bool {
        self.is_requested() || self.should_stop()
    }

    pub fn snapshot(&self) -> PowerStateSnapshot {
        PowerStateSnapshot {
            shutting_down: self.is_shutting_down(),
            updating: self.is_updating(),
            requested: self.is_requested(),
        }
    }
}
