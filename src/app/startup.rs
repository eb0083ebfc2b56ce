//! Startup banner and logging setup.

use bladecon::build_info::startup_metadata_line;
use bladecon::ui::render_banner;
use tracing_subscriber::EnvFilter;

/// Env var holding the tracing filter directive.
pub(crate) const LOG_ENV: &str = "BLADECON_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Message shown right before teardown.
pub(crate) const STOPPING_MESSAGE: &str = "Stopping CLI...";

/// Install the stderr subscriber. Safe to call more than once.
pub(crate) fn init_tracing(color: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .try_init();
}

fn log_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Render the banner for a ready console.
pub(crate) fn render_startup_banner(color: bool, slogan: &str) {
    render_banner(color, slogan, &startup_metadata_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_falls_back_to_warn() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("bladecon=debug")).to_string(), "bladecon=debug");
    }
}
