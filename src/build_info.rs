//! Compile-time build metadata exposed to CLI/banner surfaces.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time, `-dirty` when built from edits.
pub const GIT_COMMIT: &str = env!("BLADECON_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("BLADECON_BUILD_TIMESTAMP");

/// Cargo profile (`debug`/`release`) the binary was built with.
pub const BUILD_PROFILE: &str = env!("BLADECON_BUILD_PROFILE");

/// Help trailer block that surfaces build metadata in `bladecon --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("BLADECON_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("BLADECON_BUILD_TIMESTAMP"),
    "\n  profile: ",
    env!("BLADECON_BUILD_PROFILE")
);

/// Concise metadata line shown under the startup banner. The profile is
/// only named for non-release builds.
pub fn startup_metadata_line() -> String {
    if BUILD_PROFILE == "release" {
        format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
    } else {
        format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP}, {BUILD_PROFILE})")
    }
}
