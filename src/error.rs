//! Unified error types for the console.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Toml(toml::de::Error),
    /// Bootstrap descriptor carries an empty `configDir`.
    MissingConfigDir,
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::MissingConfigDir => {
                write!(f, "configDir is empty; please set up the bootstrap config first")
            }
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// RpcError
// ---------------------------------------------------------------------------

/// Errors from the RPC client layer.
#[derive(Debug)]
pub enum RpcError {
    /// The endpoint never accepted a connection.
    Connect(String),
    /// Socket-level failure after the connection was established.
    Transport(String),
    /// The peer answered with a JSON-RPC error object.
    Remote { code: i64, message: String },
    /// The peer answered with something that is not a JSON-RPC response.
    Protocol(String),
    /// A call timed out waiting for its response.
    Timeout(String),
    /// The client is not connected (never connected, or already closed).
    Closed,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Remote { code, message } => write!(f, "remote error {code}: {message}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::Timeout(method) => write!(f, "call `{method}` timed out"),
            Self::Closed => write!(f, "rpc client is not connected"),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SpawnError
// ---------------------------------------------------------------------------

/// Errors from worker process supervision.
#[derive(Debug)]
pub enum SpawnError {
    /// The worker process could not be created.
    Spawn { program: String, source: std::io::Error },
    /// The OS did not report a pid for the child.
    MissingPid,
    /// Delivering a termination signal failed.
    Signal(String),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, source } => write!(f, "failed to spawn `{program}`: {source}"),
            Self::MissingPid => write!(f, "worker process has no pid"),
            Self::Signal(msg) => write!(f, "failed to signal worker: {msg}"),
        }
    }
}

impl std::error::Error for SpawnError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Errors while resolving or initializing an application plugin.
#[derive(Debug)]
pub enum AppError {
    /// A discovered descriptor claims the reserved built-in name.
    ReservedName { requested: String, app_name: String },
    /// No descriptor exists for the requested application.
    NotFound { requested: String, path: std::path::PathBuf },
    /// The descriptor file exists but could not be read or parsed.
    Descriptor(ConfigError),
    /// Application-specific initialization was rejected by the worker.
    Rpc(RpcError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedName {
                requested,
                app_name,
            } => write!(
                f,
                "app `{requested}` declares appName `{app_name}`, which is a reserved built-in name"
            ),
            Self::NotFound { requested, path } => {
                write!(f, "app `{requested}` not found (expected {})", path.display())
            }
            Self::Descriptor(e) => write!(f, "descriptor: {e}"),
            Self::Rpc(e) => write!(f, "rpc: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<RpcError> for AppError {
    fn from(e: RpcError) -> Self {
        Self::Rpc(e)
    }
}

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Failure of one initialization step. Every variant is fatal.
#[derive(Debug)]
pub enum PipelineError {
    Connect(RpcError),
    Configure(RpcError),
    /// The operator prompt could not be read.
    Prompt(std::io::Error),
    /// The `unlock` call itself was rejected.
    Unlock(RpcError),
    /// The worker answered `unlock` with anything other than `true`.
    WrongCredential,
    Init(AppError),
}

impl PipelineError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "failed to connect to worker rpc: {e}"),
            Self::Configure(e) => write!(f, "fully_initialize failed: {e}"),
            Self::Prompt(e) => write!(f, "failed to read master password: {e}"),
            Self::Unlock(e) => write!(f, "unlock call failed: {e}"),
            Self::WrongCredential => write!(f, "wrong password"),
            Self::Init(e) => write!(f, "app init failed: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

// ---------------------------------------------------------------------------
// ConsoleError
// ---------------------------------------------------------------------------

/// Top-level error type for console startup.
#[derive(Debug)]
pub enum ConsoleError {
    Config(ConfigError),
    Spawn(SpawnError),
    App(AppError),
    Pipeline(PipelineError),
}

impl ConsoleError {
    /// Process exit status; startup failures are always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Pipeline(e) => e.exit_code(),
            Self::Config(_) | Self::Spawn(_) | Self::App(_) => 1,
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Spawn(e) => write!(f, "worker: {e}"),
            Self::App(e) => write!(f, "app: {e}"),
            Self::Pipeline(e) => write!(f, "startup: {e}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<ConfigError> for ConsoleError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SpawnError> for ConsoleError {
    fn from(e: SpawnError) -> Self {
        Self::Spawn(e)
    }
}

impl From<AppError> for ConsoleError {
    fn from(e: AppError) -> Self {
        Self::App(e)
    }
}

impl From<PipelineError> for ConsoleError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}
