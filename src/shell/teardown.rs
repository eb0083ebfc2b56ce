//! The single shutdown path.

use std::sync::Arc;

use tracing::{info, warn};

use crate::rpc::RpcClient;
use crate::worker::{Signal, WorkerControl};

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    /// `.exit` / `exit`.
    Command,
    /// Input closed (Ctrl-D or a closed pipe).
    EndOfInput,
    /// Ctrl-C.
    Interrupt,
    /// Startup failed after the worker was spawned.
    Abort,
}

/// What teardown managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    pub client_closed: bool,
    pub worker_signalled: bool,
}

/// Closes the RPC client, then stops the worker.
///
/// Consumed by [`Teardown::run`], so it runs at most once.
pub struct Teardown {
    client: Option<Arc<dyn RpcClient>>,
    worker: Box<dyn WorkerControl>,
    signal: Signal,
}

impl Teardown {
    pub fn new(worker: Box<dyn WorkerControl>) -> Self {
        Self {
            client: None,
            worker,
            signal: Signal::default(),
        }
    }

    /// Attach the client to close first. Before an app is bound there is none.
    pub fn with_client(mut self, client: Arc<dyn RpcClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = signal;
        self
    }

    /// Runs unconditionally to the end: a failed close never keeps the
    /// worker alive.
    pub async fn run(mut self, trigger: ExitTrigger) -> TeardownReport {
        info!(?trigger, "tearing down");
        let client_closed = match &self.client {
            Some(client) => match client.close().await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "failed to close rpc client");
                    false
                }
            },
            None => false,
        };
        let worker_signalled = match self.worker.terminate(self.signal) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to stop worker");
                false
            }
        };
        TeardownReport {
            client_closed,
            worker_signalled,
        }
    }
}
