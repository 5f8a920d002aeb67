//! Built-in modules run by the agent's scheduler

pub mod heartbeat;
pub mod power_management;

use lifecycle::{Module, PowerOrchestrator};
use std::sync::Arc;
use tracing::warn;

pub use heartbeat::Heartbeat;
pub use power_management::PowerManagement;

/// Instantiate the named modules in order. Unknown names are skipped.
pub fn build_modules(names: &[String], orchestrator: &Arc<PowerOrchestrator>) -> Vec<Arc<dyn Module>> {
    let mut modules: Vec<Arc<dyn Module>> = Vec::with_capacity(names.len());

    for name in names {
        match name.to_ascii_lowercase().as_str() {
            "powermanagement" => modules.push(Arc::new(PowerManagement::new(orchestrator.clone()))),
            "heartbeat" => modules.push(Arc::new(Heartbeat::new())),
            _ => warn!("Unknown module '{}' in configuration, skipping", name),
        }
    }

    modules
}
