//! Scheduler hooks backed by the agent configuration

use async_trait::async_trait;
use lifecycle::constants::scheduler::MIN_SLEEP_SECONDS;
use lifecycle::{Response, ServiceHooks};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;

pub struct AgentHooks {
    config: Arc<AgentConfig>,
}

impl AgentHooks {
    pub fn new(config: Arc<AgentConfig>) -> Self {
        if let Some(seconds) = config.scheduler.sleep_seconds {
            if seconds < MIN_SLEEP_SECONDS {
                warn!(
                    "Configured sleep time {}s is below the recommended minimum of {}s",
                    seconds, MIN_SLEEP_SECONDS
                );
            }
        }
        Self { config }
    }
}

#[async_trait]
impl ServiceHooks for AgentHooks {
    fn server_address(&self) -> Option<String> {
        self.config.server_address()
    }

    fn client_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    async fn load(&self) -> anyhow::Result<()> {
        info!(
            "{} loaded with modules: {}",
            self.config.service_name,
            self.config.scheduler.modules.join(", ")
        );
        Ok(())
    }

    async fn unload(&self) -> anyhow::Result<()> {
        info!("{} unloaded", self.config.service_name);
        Ok(())
    }

    /// Re-read the loop data file. Missing or malformed files yield `None`.
    async fn loop_data(&self) -> Option<Response> {
        let path = self.config.scheduler.loop_data_path.as_deref()?;

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No loop data at {}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => Some(Response::from_value(value)),
            Err(e) => {
                warn!("Ignoring malformed loop data in {}: {}", path, e);
                None
            }
        }
    }

    async fn sleep_time(&self) -> Option<u64> {
        self.config.scheduler.sleep_seconds
    }
}
