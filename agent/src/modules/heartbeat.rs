use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lifecycle::{Module, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const NAME: &str = "Heartbeat";

/// Logs that the loop is alive and which payload sections it received.
pub struct Heartbeat {
    beats: AtomicU64,
    last_beat: Mutex<Option<DateTime<Utc>>>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self {
            beats: AtomicU64::new(0),
            last_beat: Mutex::new(None),
        }
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    pub fn last_beat(&self) -> Option<DateTime<Utc>> {
        *self
            .last_beat
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for Heartbeat {
    fn name(&self) -> &str {
        NAME
    }

    async fn start(&self, data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        *self
            .last_beat
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(now);

        let keys: Vec<&str> = data.keys().collect();
        info!(
            "Heartbeat #{} at {}, payload keys: [{}]",
            beat,
            now.format("%Y-%m-%d %H:%M:%S UTC"),
            keys.join(", ")
        );
        Ok(())
    }
}
