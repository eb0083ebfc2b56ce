//! Console settings loading.
//!
//! Source order: explicit path > local `./bladecon.toml` > global
//! `~/.config/bladecon/bladecon.toml` > built-in defaults. Environment
//! overrides are applied last.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

use super::defaults::SETTINGS_FILE_NAME;
use super::ConsoleSettings;

/// Env var that replaces the worker program.
pub const ENV_WORKER_PROGRAM: &str = "BLADECON_WORKER";
/// Env var that replaces the applications directory.
pub const ENV_APPS_DIR: &str = "BLADECON_APPS_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SettingsSource {
    /// Loaded from explicit `--settings` path.
    Explicit(PathBuf),
    /// Loaded from `./bladecon.toml`.
    Local,
    /// Loaded from the per-user config directory.
    Global(PathBuf),
    /// No file found; defaults were used.
    BuiltInDefaults,
}

/// Load console settings from disk and environment.
pub fn load_settings(path_override: Option<&Path>) -> Result<ConsoleSettings, ConfigError> {
    load_settings_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        dirs::config_dir,
    )
}

pub(super) fn load_settings_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<ConsoleSettings, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_settings_text(path_override, &read_file, &config_root)?;
    debug!(?source, "loading console settings");
    let mut settings: ConsoleSettings = toml::from_str(&text)?;
    apply_env_overrides(&mut settings, &env_lookup);
    validate(&settings)?;
    Ok(settings)
}

fn read_settings_text<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, SettingsSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(path) = path_override {
        let text = read_file(path)?;
        return Ok((text, SettingsSource::Explicit(path.to_path_buf())));
    }
    if let Ok(text) = read_file(Path::new(SETTINGS_FILE_NAME)) {
        return Ok((text, SettingsSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join("bladecon").join(SETTINGS_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok((text, SettingsSource::Global(global)));
        }
    }
    Ok((String::new(), SettingsSource::BuiltInDefaults))
}

fn apply_env_overrides<FEnv>(settings: &mut ConsoleSettings, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(program) = non_empty(env_lookup(ENV_WORKER_PROGRAM)) {
        settings.worker.program = program;
    }
    if let Some(dir) = non_empty(env_lookup(ENV_APPS_DIR)) {
        settings.apps.dir = PathBuf::from(dir);
    }
}

fn validate(settings: &ConsoleSettings) -> Result<(), ConfigError> {
    if settings.worker.program.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "worker.program must not be empty".to_string(),
        ));
    }
    if settings.rpc.connect_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "rpc.connect_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if settings.rpc.call_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "rpc.call_timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
