//! Modules with scripted behavior
//!
//! All of them append their name to a shared run log when started, so tests
//! can assert which modules ran and in what order.

use anyhow::bail;
use async_trait::async_trait;
use lifecycle::{Module, PowerState, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn record(log: &RunLog, name: &str) {
    log.lock().unwrap().push(name.to_string());
}

/// Records its name and the payload it was given.
pub struct RecordingModule {
    pub name: String,
    pub log: RunLog,
    pub payloads: Mutex<Vec<Response>>,
}

impl RecordingModule {
    pub fn new(name: &str, log: &RunLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<Response> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Module for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        self.payloads.lock().unwrap().push(data.clone());
        Ok(())
    }
}

/// Always returns an error.
pub struct FailingModule {
    pub name: String,
    pub log: RunLog,
}

impl FailingModule {
    pub fn new(name: &str, log: &RunLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl Module for FailingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        bail!("{} could not reach the server", self.name)
    }
}

/// Always panics.
pub struct PanickingModule {
    pub name: String,
    pub log: RunLog,
}

impl PanickingModule {
    pub fn new(name: &str, log: &RunLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl Module for PanickingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        panic!("{} hit an unexpected state", self.name);
    }
}

/// Sets the Requested flag the first time it runs.
pub struct RequestingModule {
    pub name: String,
    pub log: RunLog,
    pub state: Arc<PowerState>,
    fired: AtomicBool,
}

impl RequestingModule {
    pub fn new(name: &str, log: &RunLog, state: &Arc<PowerState>) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            state: state.clone(),
            fired: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Module for RequestingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.state.set_requested(true);
        }
        Ok(())
    }
}

/// Runs until its cancellation token fires.
pub struct BlockingModule {
    pub name: String,
    pub log: RunLog,
    pub observed_cancel: AtomicBool,
}

impl BlockingModule {
    pub fn new(name: &str, log: &RunLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            observed_cancel: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Module for BlockingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _data: &Response, cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        cancel.cancelled().await;
        self.observed_cancel.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Sets ShuttingDown or Updating when it runs, like a dispatched power event.
pub struct StoppingModule {
    pub name: String,
    pub log: RunLog,
    pub state: Arc<PowerState>,
    updating: bool,
}

impl StoppingModule {
    pub fn shutting_down(name: &str, log: &RunLog, state: &Arc<PowerState>) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            state: state.clone(),
            updating: false,
        }
    }

    pub fn updating(name: &str, log: &RunLog, state: &Arc<PowerState>) -> Self {
        Self {
            updating: true,
            ..Self::shutting_down(name, log, state)
        }
    }
}

#[async_trait]
impl Module for StoppingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, _data: &Response, _cancel: CancellationToken) -> anyhow::Result<()> {
        record(&self.log, &self.name);
        if self.updating {
            self.state.set_updating(true);
        } else {
            self.state.set_shutting_down(true);
        }
        Ok(())
    }
}
