//! Agent configuration loaded from `config/agent.toml`

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";
pub const DEV_API_KEY: &str = "default-development-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Bearer token for the control API; `AGENT_API_KEY` takes precedence
    pub api_key: Option<String>,
    pub server: ServerSettings,
    #[serde(default)]
    pub listen: ListenSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Where the managed clients talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default)]
    pub https: bool,
    pub host: Option<String>,
    #[serde(default = "default_web_root")]
    pub web_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between rounds; unset uses the scheduler default
    pub sleep_seconds: Option<u64>,
    /// JSON file read at the start of every round
    pub loop_data_path: Option<String>,
    /// Modules to run, in order
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
}

fn default_service_name() -> String {
    "HostAgent".to_string()
}

fn default_web_root() -> String {
    "/fog".to_string()
}

fn default_modules() -> Vec<String> {
    vec!["PowerManagement".to_string(), "Heartbeat".to_string()]
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8745,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            sleep_seconds: None,
            loop_data_path: None,
            modules: default_modules(),
        }
    }
}

impl ServerSettings {
    /// `http(s)://{host}{web_root}`, or `None` without a host.
    pub fn address(&self) -> Option<String> {
        let host = self.host.as_deref().map(str::trim).filter(|h| !h.is_empty())?;
        let scheme = if self.https { "https" } else { "http" };
        let web_root = self.web_root.trim().trim_end_matches('/');
        let web_root = if web_root.is_empty() || web_root.starts_with('/') {
            web_root.to_string()
        } else {
            format!("/{}", web_root)
        };
        Some(format!("{}://{}{}", scheme, host, web_root))
    }
}

impl AgentConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading agent config: {}", path.display());

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;

        info!(
            "Configuration loaded: service '{}', {} module(s)",
            config.service_name,
            config.scheduler.modules.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn server_address(&self) -> Option<String> {
        self.server.address()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }
}

/// Pick the API key: environment first, then config, then the development
/// default. The flag is `true` when the development default was used.
pub fn select_api_key(from_env: Option<String>, configured: Option<&str>) -> (String, bool) {
    let chosen = from_env
        .filter(|key| !key.is_empty())
        .or_else(|| configured.filter(|key| !key.is_empty()).map(str::to_string));
    match chosen {
        Some(key) => {
            let is_default = key == DEV_API_KEY;
            (key, is_default)
        }
        None => (DEV_API_KEY.to_string(), true),
    }
}
