//! edged.toml configuration parser.
//!
//! Every field is optional; anything left out falls back to the defaults
//! below so that an empty file (or no file at all) yields a runnable
//! single-host setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AGENT_ADDR: &str = "0.0.0.0:50051";
pub const DEFAULT_DATA_DIR: &str = "/var/lib/edgegrid";
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub control_plane: ControlPlaneConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// Address the REST API listens on.
    pub api_addr: String,
    /// Directory holding the redb database.
    pub data_dir: PathBuf,
    /// Deadline applied to every call made to a node agent.
    pub rpc_timeout_ms: u64,
    /// How long to wait when establishing a channel to a node agent.
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Address the agent's gRPC service listens on.
    pub listen_addr: String,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            api_addr: DEFAULT_API_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_AGENT_ADDR.to_string(),
        }
    }
}

impl ControlPlaneConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl EdgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EdgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
