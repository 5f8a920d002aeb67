use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lifecycle::{Module, PowerAction, PowerEvent, PowerOrchestrator, Response};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const NAME: &str = "PowerManagement";

/// Turns a server-side power task into a [`PowerEvent`].
///
/// Expects `{"action": "...", "comment": "..."}` under its name in the round
/// payload. An empty payload means nothing is scheduled.
pub struct PowerManagement {
    orchestrator: Arc<PowerOrchestrator>,
}

impl PowerManagement {
    pub fn new(orchestrator: Arc<PowerOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl Module for PowerManagement {
    fn name(&self) -> &str {
        NAME
    }

    async fn start(&self, data: &Response, _cancel: CancellationToken) -> Result<()> {
        let Some(action) = data.get_field("action") else {
            debug!("No power task scheduled");
            return Ok(());
        };

        let action: PowerAction = action.parse().map_err(|e: String| anyhow!(e))?;
        let comment = data
            .get_field("comment")
            .unwrap_or("Power management task")
            .to_string();

        info!("Power task received: {} ({})", action, comment);
        // Not awaited: a shutdown sequence only ends with the machine.
        drop(self.orchestrator.dispatch(PowerEvent::new(action, comment)));
        Ok(())
    }
}
