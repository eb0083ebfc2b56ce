//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Loading and precedence rules
//! live in `bootstrap` and `settings`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_APPS_DIR, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_WORKER_PROGRAM, DESCRIPTOR_KEY, PRIMARY_FRAGMENT_KEY,
};

/// Bootstrap descriptor read once at process start.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Directory holding the configuration fragments. Empty is fatal.
    #[serde(rename = "configDir", default)]
    pub config_dir: String,
}

/// Host/port pair handed to the worker and used by the RPC client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
}

impl ConnectionParams {
    /// Websocket endpoint served by the worker.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Immutable configuration produced once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Parsed fragments keyed by their merged-config name (`geth`, `ipfs`).
    pub raw_fragments: BTreeMap<String, Value>,
}

impl ResolvedConfig {
    pub fn connection(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
        }
    }

    /// `networkID` from the primary fragment, or `null` when absent.
    pub fn network_id(&self) -> Value {
        self.raw_fragments
            .get(PRIMARY_FRAGMENT_KEY)
            .and_then(|fragment| fragment.get("networkID"))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Single payload for `fully_initialize`: every fragment plus the
    /// application descriptor under `appOpts`.
    pub fn merged_payload(&self, descriptor: &Value) -> Value {
        let mut merged = Map::new();
        for (key, fragment) in &self.raw_fragments {
            merged.insert(key.clone(), fragment.clone());
        }
        merged.insert(DESCRIPTOR_KEY.to_string(), descriptor.clone());
        Value::Object(merged)
    }
}

/// Console-local settings (worker command, app discovery, RPC timing).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub worker: WorkerSettings,
    pub apps: AppsSettings,
    pub rpc: RpcSettings,
    pub display: DisplaySettings,
}

/// How to launch the worker process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_WORKER_PROGRAM.to_string(),
            args: Vec::new(),
            cwd: None,
        }
    }
}

/// Application discovery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppsSettings {
    pub dir: PathBuf,
}

impl Default for AppsSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_APPS_DIR),
        }
    }
}

/// RPC client timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub connect_timeout_secs: u64,
    pub call_timeout_secs: u64,
}

impl RpcSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

/// Display preferences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { color: true }
    }
}
