//! Bootstrap descriptor and configuration fragment resolution.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;

use super::defaults::{
    DEFAULT_RPC_HOST, DEFAULT_RPC_PORT, PRIMARY_FRAGMENT_FILE, PRIMARY_FRAGMENT_KEY,
    SERVICE_FRAGMENT_FILE, SERVICE_FRAGMENT_KEY,
};
use super::{BootstrapConfig, ResolvedConfig};

/// Read the bootstrap descriptor from `path`.
pub fn load_bootstrap(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    load_bootstrap_with(path, |p| std::fs::read_to_string(p))
}

pub(crate) fn load_bootstrap_with<FRead>(
    path: &Path,
    read_file: FRead,
) -> Result<BootstrapConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let text = read_file(path).map_err(|e| {
        ConfigError::Invalid(format!(
            "failed to read bootstrap config `{}`: {e}",
            path.display()
        ))
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Load both fragments from the bootstrap `configDir` and resolve RPC params.
pub fn resolve_config(bootstrap: &BootstrapConfig) -> Result<ResolvedConfig, ConfigError> {
    resolve_config_with(bootstrap, |p| std::fs::read_to_string(p))
}

pub(crate) fn resolve_config_with<FRead>(
    bootstrap: &BootstrapConfig,
    read_file: FRead,
) -> Result<ResolvedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    if bootstrap.config_dir.is_empty() {
        return Err(ConfigError::MissingConfigDir);
    }
    let dir = Path::new(&bootstrap.config_dir);

    let primary = read_fragment(&dir.join(PRIMARY_FRAGMENT_FILE), &read_file)?;
    let service = read_fragment(&dir.join(SERVICE_FRAGMENT_FILE), &read_file)?;

    let rpc_port = resolve_port(primary.get("rpcport"))?;
    let rpc_host = resolve_host(primary.get("rpchost"))?;
    debug!(rpc_host = %rpc_host, rpc_port, dir = %dir.display(), "resolved configuration");

    let mut raw_fragments = BTreeMap::new();
    raw_fragments.insert(PRIMARY_FRAGMENT_KEY.to_string(), primary);
    raw_fragments.insert(SERVICE_FRAGMENT_KEY.to_string(), service);

    Ok(ResolvedConfig {
        rpc_host,
        rpc_port,
        raw_fragments,
    })
}

fn read_fragment<FRead>(path: &Path, read_file: &FRead) -> Result<Value, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let text = read_file(path).map_err(|e| {
        ConfigError::Invalid(format!("failed to read `{}`: {e}", path.display()))
    })?;
    let value: Value = serde_json::from_str(&text)?;
    if !value.is_object() {
        return Err(ConfigError::Invalid(format!(
            "`{}` must contain a JSON object",
            path.display()
        )));
    }
    Ok(value)
}

/// Falsy values (`null`, `0`, `""`, `false`) fall back to the default port.
fn resolve_port(value: Option<&Value>) -> Result<u16, ConfigError> {
    let invalid = |v: &Value| ConfigError::Invalid(format!("rpcport `{v}` is not a valid port"));
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(DEFAULT_RPC_PORT),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(DEFAULT_RPC_PORT),
        Some(v @ Value::String(s)) => match s.trim().parse::<u16>() {
            Ok(0) => Ok(DEFAULT_RPC_PORT),
            Ok(port) => Ok(port),
            Err(_) => Err(invalid(v)),
        },
        Some(v @ Value::Number(n)) => match n.as_u64() {
            Some(0) => Ok(DEFAULT_RPC_PORT),
            Some(port) => u16::try_from(port).map_err(|_| invalid(v)),
            None => Err(invalid(v)),
        },
        Some(v) => Err(invalid(v)),
    }
}

fn resolve_host(value: Option<&Value>) -> Result<String, ConfigError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(DEFAULT_RPC_HOST.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(DEFAULT_RPC_HOST.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(v) => Err(ConfigError::Invalid(format!(
            "rpchost `{v}` must be a string"
        ))),
    }
}
