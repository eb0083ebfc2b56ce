//! Built-in configuration defaults.

/// RPC port used when the primary fragment omits `rpcport`.
pub const DEFAULT_RPC_PORT: u16 = 3000;

/// RPC host used when the primary fragment omits `rpchost`.
pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";

/// Bootstrap descriptor location, relative to the working directory.
pub const DEFAULT_BOOTSTRAP_PATH: &str = ".local/bootstrap_config.json";

/// Primary fragment file name inside `configDir`.
pub const PRIMARY_FRAGMENT_FILE: &str = "config.json";

/// Service fragment file name inside `configDir`.
pub const SERVICE_FRAGMENT_FILE: &str = "ipfsserv.json";

/// Key of the primary fragment inside the merged configuration.
pub const PRIMARY_FRAGMENT_KEY: &str = "geth";

/// Key of the service fragment inside the merged configuration.
pub const SERVICE_FRAGMENT_KEY: &str = "ipfs";

/// Key of the application descriptor inside the merged configuration.
pub const DESCRIPTOR_KEY: &str = "appOpts";

/// Worker executable launched when nothing overrides it.
pub const DEFAULT_WORKER_PROGRAM: &str = "bladeiron";

/// Directory searched for application descriptors.
pub const DEFAULT_APPS_DIR: &str = "dapps";

/// How long `connect` waits for a freshly spawned worker to accept.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Upper bound for a single RPC call.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

/// Local console settings file name.
pub const SETTINGS_FILE_NAME: &str = "bladecon.toml";
