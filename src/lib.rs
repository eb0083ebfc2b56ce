//! bladecon: a bootstrap console for an RPC-serving worker process.
//!
//! The console spawns one worker that hosts a websocket JSON-RPC server,
//! binds an application to it, runs a strictly ordered initialization
//! pipeline (connect, configure, optional unlock, app init), and then hands
//! control to an interactive shell. Leaving the shell closes the RPC client
//! and stops the worker.
//!
//! ```no_run
//! use bladecon::config::{load_bootstrap, resolve_config};
//!
//! # fn example() -> Result<(), bladecon::error::ConfigError> {
//! let bootstrap = load_bootstrap(".local/bootstrap_config.json".as_ref())?;
//! let config = resolve_config(&bootstrap)?;
//! println!("worker rpc at {}", config.connection().ws_url());
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod build_info;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod rpc;
pub mod secret;
pub mod shell;
#[cfg(test)]
pub mod testsupport;
pub mod ui;
pub mod worker;
