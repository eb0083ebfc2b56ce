//! Application descriptor.
//!
//! Only the keys the console itself reads are typed. Everything else an app
//! declares rides along in `extra` and reaches the worker unchanged, and
//! absent keys stay absent on the wire.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Static metadata describing one application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    pub app_name: String,
    pub artifact_dir: PathBuf,
    pub condition_dir: PathBuf,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub contracts: Option<Value>,
    #[serde(
        rename = "networkID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub network_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    /// Credential reference. The key being present, even as `null`, means
    /// the app must be unlocked.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub account: Option<Value>,
    /// App-specific keys the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `Some` for any value the key carries, `null` included. Missing keys fall
/// back to `None` through `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl AppDescriptor {
    /// Descriptor carrying only the required keys.
    pub fn new(
        app_name: impl Into<String>,
        artifact_dir: impl Into<PathBuf>,
        condition_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            artifact_dir: artifact_dir.into(),
            condition_dir: condition_dir.into(),
            contracts: None,
            network_id: None,
            version: None,
            account: None,
            extra: Map::new(),
        }
    }

    /// Whether the unlock step applies.
    pub fn requires_unlock(&self) -> bool {
        self.account.is_some()
    }

    /// JSON form as sent to the worker.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse a descriptor file.
    pub fn from_file<FRead>(path: &Path, read_file: FRead) -> Result<Self, ConfigError>
    where
        FRead: Fn(&Path) -> Result<String, std::io::Error>,
    {
        let text = read_file(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
