//! CLI argument parsing via clap.

use std::path::PathBuf;

use bladecon::apps::BUILTIN_APP_KEY;
use bladecon::build_info::HELP_BUILD_METADATA;
use bladecon::config::defaults::DEFAULT_BOOTSTRAP_PATH;
use clap::Parser;

/// Bootstrap console: spawns the RPC worker, initializes an app, and opens a shell.
#[derive(Debug, Parser)]
#[command(name = "bladecon", version, after_help = HELP_BUILD_METADATA)]
pub struct Args {
    /// Application to load. `11be` selects the built-in console.
    #[arg(default_value = BUILTIN_APP_KEY)]
    pub app: String,

    /// Bootstrap descriptor carrying `configDir`.
    #[arg(long = "bootstrap", default_value = DEFAULT_BOOTSTRAP_PATH)]
    pub bootstrap: PathBuf,

    /// Console settings file (default: ./bladecon.toml or ~/.config/bladecon/bladecon.toml).
    #[arg(long = "settings")]
    pub settings: Option<PathBuf>,

    /// Override the worker program.
    #[arg(long = "worker")]
    pub worker: Option<String>,

    /// Override the applications directory.
    #[arg(long = "apps-dir")]
    pub apps_dir: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}
