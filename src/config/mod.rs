//! Configuration loading.
//!
//! Two independent inputs feed the console:
//! - the bootstrap descriptor plus its JSON fragments, resolved once into an
//!   immutable [`ResolvedConfig`];
//! - optional TOML console settings that say how to launch the worker and
//!   where applications live.

mod bootstrap;
pub mod defaults;
mod settings;
mod types;

pub use bootstrap::{load_bootstrap, resolve_config};
pub use settings::{load_settings, ENV_APPS_DIR, ENV_WORKER_PROGRAM};
pub use types::{
    AppsSettings, BootstrapConfig, ConnectionParams, ConsoleSettings, DisplaySettings,
    ResolvedConfig, RpcSettings, WorkerSettings,
};
