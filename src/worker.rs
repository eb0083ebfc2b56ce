//! Worker process supervision.
//!
//! Exactly one worker hosts the RPC server for the lifetime of the console.
//! The console never shares memory with it; the only channels are the
//! `rpchost`/`rpcport` environment handed over at spawn time and the RPC
//! endpoint it then serves.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::{ConnectionParams, WorkerSettings};
use crate::error::SpawnError;

/// Environment key carrying the RPC port.
pub const ENV_RPC_PORT: &str = "rpcport";
/// Environment key carrying the RPC host.
pub const ENV_RPC_HOST: &str = "rpchost";

/// Termination signal sent to the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT; what an operator pressing Ctrl-C would send.
    #[default]
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGKILL.
    Kill,
}

/// Anything that can be told to stop. Implemented by [`WorkerHandle`] and by
/// test doubles.
pub trait WorkerControl: Send {
    /// Send `signal` without waiting for the process to exit.
    fn terminate(&mut self, signal: Signal) -> Result<(), SpawnError>;
}

/// What to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl From<&WorkerSettings> for WorkerSpec {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            cwd: settings.cwd.clone(),
        }
    }
}

/// Starts the worker.
#[derive(Debug, Clone)]
pub struct WorkerSupervisor {
    spec: WorkerSpec,
}

impl WorkerSupervisor {
    pub fn new(spec: WorkerSpec) -> Self {
        Self { spec }
    }

    /// Spawn the worker with `rpchost`/`rpcport` in its environment.
    ///
    /// The child inherits stdout/stderr so its own diagnostics stay visible;
    /// stdin is detached because the console owns the terminal.
    pub fn spawn(&self, conn: &ConnectionParams) -> Result<WorkerHandle, SpawnError> {
        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&self.spec.args)
            .env(ENV_RPC_PORT, conn.port.to_string())
            .env(ENV_RPC_HOST, &conn.host)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false);
        if let Some(cwd) = &self.spec.cwd {
            cmd.current_dir(cwd);
        }

        let child = cmd.spawn().map_err(|source| SpawnError::Spawn {
            program: self.spec.program.clone(),
            source,
        })?;
        let pid = child.id().ok_or(SpawnError::MissingPid)?;
        info!(pid, program = %self.spec.program, host = %conn.host, port = conn.port, "worker started");
        Ok(WorkerHandle {
            child,
            pid,
            signalled: None,
        })
    }
}

/// Handle to the one live worker.
#[derive(Debug)]
pub struct WorkerHandle {
    child: Child,
    pid: u32,
    signalled: Option<Signal>,
}

impl WorkerHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Last signal delivered, if any.
    pub fn signalled(&self) -> Option<Signal> {
        self.signalled
    }

    /// Wait for the worker to exit. Only used where the caller explicitly
    /// wants confirmation; teardown itself never waits.
    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    /// Whether the worker already exited, without blocking.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }
}

impl WorkerControl for WorkerHandle {
    fn terminate(&mut self, signal: Signal) -> Result<(), SpawnError> {
        if self.has_exited() {
            debug!(pid = self.pid, "worker already exited");
            return Ok(());
        }
        send_signal(&mut self.child, self.pid, signal)?;
        self.signalled = Some(signal);
        info!(pid = self.pid, ?signal, "worker signalled");
        Ok(())
    }
}

#[cfg(unix)]
fn send_signal(child: &mut Child, pid: u32, signal: Signal) -> Result<(), SpawnError> {
    use nix::sys::signal::{kill, Signal as NixSignal};
    use nix::unistd::Pid;

    let sig = match signal {
        Signal::Interrupt => NixSignal::SIGINT,
        Signal::Terminate => NixSignal::SIGTERM,
        Signal::Kill => return start_kill(child),
    };
    #[allow(clippy::cast_possible_wrap)]
    let target = Pid::from_raw(pid as i32);
    kill(target, sig).map_err(|errno| SpawnError::Signal(format!("{sig:?}: {errno}")))
}

#[cfg(not(unix))]
fn send_signal(child: &mut Child, _pid: u32, signal: Signal) -> Result<(), SpawnError> {
    if signal != Signal::Kill {
        warn!(?signal, "graceful signals unsupported on this platform; killing worker");
    }
    start_kill(child)
}

fn start_kill(child: &mut Child) -> Result<(), SpawnError> {
    child.start_kill().map_err(|e| {
        warn!(error = %e, "failed to kill worker");
        SpawnError::Signal(e.to_string())
    })
}
