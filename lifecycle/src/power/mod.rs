//! Power transitions: log off, hibernate, lock, shutdown and reboot
//!
//! [`PowerOrchestrator`] turns a [`PowerEvent`] into OS calls through a
//! [`PowerPlatform`]. Shutdown and reboot escalate through three tiers:
//!
//! 1. **Graceful**: non-forced requests, 5 minutes apart
//! 2. **Forced**: requests that force-close applications, 5 minutes apart
//! 3. **SafetyNet**: the plain shutdown command, re-issued every 5 minutes
//!    until the machine goes down
//!
//! A failed privilege elevation skips straight to the safety net.

pub mod orchestrator;
pub mod platform;
pub mod privilege;
pub mod reason;

pub use orchestrator::PowerOrchestrator;
pub use platform::{create_platform, PowerCommand, PowerPlatform, ShutdownRequest};
pub use privilege::PrivilegeElevator;
pub use reason::{MajorReason, MinorReason, ReasonFlags, ShutdownReason};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::power;

/// Serialized in lowercase. Deserialization goes through [`FromStr`], so any
/// case and the `restart` / `logout` aliases are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PowerAction {
    Shutdown,
    Reboot,
    LogOff,
    Hibernate,
    Lock,
}

impl PowerAction {
    /// Shutdown and reboot run the escalating sequence; the rest are single calls.
    pub fn is_power_cycle(&self) -> bool {
        matches!(self, PowerAction::Shutdown | PowerAction::Reboot)
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
            PowerAction::LogOff => "logoff",
            PowerAction::Hibernate => "hibernate",
            PowerAction::Lock => "lock",
        };
        f.write_str(name)
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shutdown" => Ok(PowerAction::Shutdown),
            "reboot" | "restart" => Ok(PowerAction::Reboot),
            "logoff" | "logout" => Ok(PowerAction::LogOff),
            "hibernate" => Ok(PowerAction::Hibernate),
            "lock" => Ok(PowerAction::Lock),
            other => Err(format!("unknown power action '{}'", other)),
        }
    }
}

impl TryFrom<String> for PowerAction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A requested power transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEvent {
    pub action: PowerAction,
    #[serde(default)]
    pub comment: String,
}

impl PowerEvent {
    pub fn new(action: PowerAction, comment: impl Into<String>) -> Self {
        Self {
            action,
            comment: comment.into(),
        }
    }
}

/// Escalation tier of a shutdown/reboot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Graceful,
    Forced,
    SafetyNet,
}

impl Tier {
    pub fn is_forced(&self) -> bool {
        matches!(self, Tier::Forced)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Graceful => f.write_str("graceful"),
            Tier::Forced => f.write_str("forced"),
            Tier::SafetyNet => f.write_str("safety net"),
        }
    }
}

/// One issued shutdown/reboot request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShutdownAttempt {
    pub tier: Tier,
    /// 1-based position within the tier
    pub ordinal: u32,
    pub forced: bool,
    pub reason: ShutdownReason,
    pub issued_at: DateTime<Utc>,
}

impl ShutdownAttempt {
    pub fn new(tier: Tier, ordinal: u32, reason: ShutdownReason) -> Self {
        Self {
            tier,
            ordinal,
            forced: tier.is_forced(),
            reason,
            issued_at: Utc::now(),
        }
    }
}

/// How an [`PowerOrchestrator::invoke`] call ended.
///
/// A shutdown or reboot only returns when aborted or rejected; on success the
/// machine goes down first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerOutcome {
    /// Single-call action issued
    Issued { action: PowerAction },
    /// Single-call action failed or did not finish in time
    Failed { action: PowerAction, reason: String },
    /// Sequence aborted by an operator during a wait
    Cancelled { tier: Tier, attempts: u32 },
    /// Another shutdown/reboot sequence is already running
    AlreadyInProgress,
}

/// Retry counts and waits for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerTimings {
    pub graceful_attempts: u32,
    pub forced_attempts: u32,
    pub attempt_wait: Duration,
    pub command_timeout: Duration,
    pub safety_net_interval: Duration,
}

impl Default for PowerTimings {
    fn default() -> Self {
        Self {
            graceful_attempts: power::GRACEFUL_ATTEMPTS,
            forced_attempts: power::FORCED_ATTEMPTS,
            attempt_wait: power::ATTEMPT_WAIT,
            command_timeout: power::COMMAND_TIMEOUT,
            safety_net_interval: power::SAFETY_NET_INTERVAL,
        }
    }
}
