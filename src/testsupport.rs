//! Shared test fixtures.
//!
//! Ordering properties are asserted against one [`EventLog`] shared by every
//! fake collaborator, so a single `Vec<String>` shows the interleaving of
//! connect, calls, prompts, init, close, and termination.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::Value;

use crate::apps::{AppDescriptor, AppPlugin};
use crate::error::{AppError, RpcError, SpawnError};
use crate::rpc::RpcClient;
use crate::secret::{Secret, SecretSource};
use crate::ui::RenderSink;
use crate::worker::{Signal, WorkerControl};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("bladecon-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().expect("event log poisoned").clone()
}

fn record(log: &EventLog, event: impl Into<String>) {
    log.lock().expect("event log poisoned").push(event.into());
}

/// Descriptor fixture; `account` toggles the unlock step.
pub fn app_descriptor(name: &str, account: Option<&str>) -> AppDescriptor {
    AppDescriptor {
        network_id: Some(Value::from(4)),
        version: Some(Value::from("1.0")),
        account: account.map(Value::from),
        ..AppDescriptor::new(name, ".", ".")
    }
}

enum Scripted {
    Value(Value),
    Reject(String),
}

/// RPC client that records every interaction. Unscripted calls answer `true`.
pub struct RecordingClient {
    log: EventLog,
    scripted: HashMap<String, Scripted>,
    connect_failure: Option<String>,
    close_failure: Option<String>,
    connected: AtomicBool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingClient {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            scripted: HashMap::new(),
            connect_failure: None,
            close_failure: None,
            connected: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, method: &str, value: Value) -> Self {
        self.scripted
            .insert(method.to_string(), Scripted::Value(value));
        self
    }

    pub fn with_rejection(mut self, method: &str, message: &str) -> Self {
        self.scripted
            .insert(method.to_string(), Scripted::Reject(message.to_string()));
        self
    }

    pub fn with_connect_failure(mut self, message: &str) -> Self {
        self.connect_failure = Some(message.to_string());
        self
    }

    pub fn with_close_failure(mut self, message: &str) -> Self {
        self.close_failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls poisoned").clone()
    }
}

#[async_trait]
impl RpcClient for RecordingClient {
    async fn connect(&self) -> Result<(), RpcError> {
        record(&self.log, "connect");
        if let Some(message) = &self.connect_failure {
            return Err(RpcError::Connect(message.clone()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        record(&self.log, format!("call:{method}"));
        self.calls
            .lock()
            .expect("calls poisoned")
            .push((method.to_string(), params));
        match self.scripted.get(method) {
            Some(Scripted::Value(value)) => Ok(value.clone()),
            Some(Scripted::Reject(message)) => Err(RpcError::Remote {
                code: -32000,
                message: message.clone(),
            }),
            None => Ok(Value::Bool(true)),
        }
    }

    async fn close(&self) -> Result<(), RpcError> {
        record(&self.log, "close");
        self.connected.store(false, Ordering::SeqCst);
        match &self.close_failure {
            Some(message) => Err(RpcError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Application whose `init` only records itself.
pub struct FakeApp {
    descriptor: AppDescriptor,
    client: Arc<RecordingClient>,
    log: EventLog,
    init_failure: Option<String>,
}

impl FakeApp {
    pub fn new(descriptor: AppDescriptor, client: Arc<RecordingClient>, log: EventLog) -> Self {
        Self {
            descriptor,
            client,
            log,
            init_failure: None,
        }
    }

    pub fn with_failing_init(mut self, message: &str) -> Self {
        self.init_failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl AppPlugin for FakeApp {
    fn descriptor(&self) -> &AppDescriptor {
        &self.descriptor
    }

    fn client(&self) -> Arc<dyn RpcClient> {
        self.client.clone()
    }

    async fn init(&self) -> Result<(), AppError> {
        record(&self.log, "init");
        match &self.init_failure {
            Some(message) => Err(AppError::Rpc(RpcError::Remote {
                code: -32000,
                message: message.clone(),
            })),
            None => Ok(()),
        }
    }
}

/// Secret source answering from a fixed script; runs dry with `UnexpectedEof`.
pub struct ScriptedSecrets {
    log: EventLog,
    answers: VecDeque<String>,
}

impl ScriptedSecrets {
    pub fn new(log: EventLog, answers: &[&str]) -> Self {
        Self {
            log,
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SecretSource for ScriptedSecrets {
    async fn ask(&mut self, label: &str) -> io::Result<Secret> {
        record(&self.log, format!("prompt:{label}"));
        self.answers
            .pop_front()
            .map(Secret::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer"))
    }
}

/// Worker double that records signals instead of sending them.
pub struct FakeWorker {
    log: EventLog,
    failure: Option<String>,
}

impl FakeWorker {
    pub fn new(log: EventLog) -> Self {
        Self { log, failure: None }
    }

    pub fn failing(log: EventLog, message: &str) -> Self {
        Self {
            log,
            failure: Some(message.to_string()),
        }
    }
}

impl WorkerControl for FakeWorker {
    fn terminate(&mut self, signal: Signal) -> Result<(), SpawnError> {
        record(&self.log, format!("terminate:{signal:?}"));
        match &self.failure {
            Some(message) => Err(SpawnError::Signal(message.clone())),
            None => Ok(()),
        }
    }
}

/// Render sink capturing `"<kind>: <text>"` lines.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("sink poisoned").clone()
    }

    fn push(&self, kind: &str, text: &str) {
        self.lines
            .lock()
            .expect("sink poisoned")
            .push(format!("{kind}: {text}"));
    }
}

impl RenderSink for RecordingSink {
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }

    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn activity(&self, text: &str) {
        self.push("activity", text);
    }
}
