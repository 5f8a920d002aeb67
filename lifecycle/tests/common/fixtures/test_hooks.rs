use async_trait::async_trait;
use lifecycle::{Response, ServiceHooks};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

pub const TEST_SERVER: &str = "https://server.example.com/fog";

/// Service hooks with fixed answers. Every `loop_data` call marks the start
/// of a round.
pub struct TestHooks {
    pub address: Option<String>,
    pub payload: Option<Response>,
    pub sleep: Option<u64>,
    pub loads: AtomicUsize,
    pub unloads: AtomicUsize,
    rounds: Mutex<Vec<Instant>>,
}

impl TestHooks {
    pub fn new() -> Self {
        Self {
            address: Some(TEST_SERVER.to_string()),
            payload: None,
            sleep: None,
            loads: AtomicUsize::new(0),
            unloads: AtomicUsize::new(0),
            rounds: Mutex::new(Vec::new()),
        }
    }

    pub fn with_address(mut self, address: Option<&str>) -> Self {
        self.address = address.map(str::to_string);
        self
    }

    pub fn with_payload(mut self, payload: Response) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_sleep(mut self, sleep: Option<u64>) -> Self {
        self.sleep = sleep;
        self
    }

    /// Start instants of every round so far.
    pub fn rounds(&self) -> Vec<Instant> {
        self.rounds.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn unload_count(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceHooks for TestHooks {
    fn server_address(&self) -> Option<String> {
        self.address.clone()
    }

    async fn load(&self) -> anyhow::Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unload(&self) -> anyhow::Result<()> {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn loop_data(&self) -> Option<Response> {
        self.rounds.lock().unwrap().push(Instant::now());
        self.payload.clone()
    }

    async fn sleep_time(&self) -> Option<u64> {
        self.sleep
    }
}
