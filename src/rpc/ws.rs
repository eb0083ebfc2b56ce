//! Websocket JSON-RPC client for the worker's RPC server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::protocol::{parse_response, JsonRpcRequest};
use super::RpcClient;
use crate::config::{ConnectionParams, RpcSettings};
use crate::error::RpcError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Reply = oneshot::Sender<Result<Value, RpcError>>;
type PendingCalls = Arc<Mutex<HashMap<u64, Reply>>>;
type CallHandles = (mpsc::UnboundedSender<Message>, PendingCalls, Arc<AtomicBool>);

/// First retry delay while waiting for a freshly spawned worker to listen.
const RECONNECT_BASE_DELAY_MS: u64 = 100;
/// Cap on the retry delay.
const MAX_RECONNECT_DELAY_MS: u64 = 2_000;
/// How long `close` waits for the close frame to flush.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// JSON-RPC 2.0 client over a single websocket connection.
pub struct WsRpcClient {
    url: String,
    connect_timeout: Duration,
    call_timeout: Duration,
    next_id: AtomicU64,
    conn: Mutex<Option<Connection>>,
}

struct Connection {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: PendingCalls,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WsRpcClient {
    pub fn new(url: impl Into<String>, connect_timeout: Duration, call_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            call_timeout,
            next_id: AtomicU64::new(1),
            conn: Mutex::new(None),
        }
    }

    /// Client for the worker endpoint described by `params`.
    pub fn for_endpoint(params: &ConnectionParams, rpc: &RpcSettings) -> Self {
        Self::new(params.ws_url(), rpc.connect_timeout(), rpc.call_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn handles(&self) -> Result<CallHandles, RpcError> {
        let guard = lock(&self.conn);
        match guard.as_ref() {
            Some(conn) if conn.alive.load(Ordering::SeqCst) => Ok((
                conn.outgoing.clone(),
                conn.pending.clone(),
                conn.alive.clone(),
            )),
            _ => Err(RpcError::Closed),
        }
    }
}

#[async_trait]
impl RpcClient for WsRpcClient {
    async fn connect(&self) -> Result<(), RpcError> {
        if self.is_connected() {
            return Ok(());
        }
        let stream = connect_with_backoff(&self.url, self.connect_timeout).await?;
        let (sink, source) = stream.split();
        let (outgoing, rx) = mpsc::unbounded_channel();
        let pending: PendingCalls = Arc::default();
        let alive = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn(write_loop(sink, rx));
        let reader = tokio::spawn(read_loop(
            source,
            pending.clone(),
            outgoing.clone(),
            alive.clone(),
        ));
        debug!(url = %self.url, "rpc connected");

        *lock(&self.conn) = Some(Connection {
            outgoing,
            pending,
            alive,
            reader,
            writer,
        });
        Ok(())
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let (outgoing, pending, alive) = self.handles()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let text = serde_json::to_string(&JsonRpcRequest::new(id, method, &params))?;

        let (tx, rx) = oneshot::channel();
        register_call(&pending, &alive, id, tx)?;
        if outgoing.send(Message::Text(text.into())).is_err() {
            lock(&pending).remove(&id);
            return Err(RpcError::Closed);
        }
        debug!(id, method, "rpc call sent");

        match timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RpcError::Closed),
            Err(_) => {
                lock(&pending).remove(&id);
                Err(RpcError::Timeout(method.to_string()))
            }
        }
    }

    async fn close(&self) -> Result<(), RpcError> {
        let Some(conn) = lock(&self.conn).take() else {
            return Ok(());
        };
        conn.alive.store(false, Ordering::SeqCst);
        let sent = conn.outgoing.send(Message::Close(None));
        if timeout(CLOSE_GRACE, conn.writer).await.is_err() {
            warn!(url = %self.url, "close frame did not flush in time");
        }
        conn.reader.abort();
        fail_pending(&conn.pending, || RpcError::Closed);
        debug!(url = %self.url, "rpc closed");
        sent.map_err(|_| RpcError::Transport("connection already lost".to_string()))
    }

    fn is_connected(&self) -> bool {
        lock(&self.conn)
            .as_ref()
            .is_some_and(|conn| conn.alive.load(Ordering::SeqCst))
    }
}

impl Drop for WsRpcClient {
    fn drop(&mut self) {
        if let Some(conn) = lock(&self.conn).take() {
            conn.reader.abort();
            conn.writer.abort();
        }
    }
}

/// Dial `url` until it accepts or `limit` elapses.
async fn connect_with_backoff(url: &str, limit: Duration) -> Result<WsStream, RpcError> {
    let deadline = Instant::now() + limit;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let failure = match timeout_at(deadline, connect_async(url)).await {
            Ok(Ok((stream, _))) => return Ok(stream),
            Ok(Err(err)) => err.to_string(),
            Err(_) => "timed out".to_string(),
        };
        let delay = backoff_delay(attempt);
        if Instant::now() + delay >= deadline {
            return Err(RpcError::Connect(format!(
                "{url}: {failure} (gave up after {attempt} attempts)"
            )));
        }
        debug!(url, attempt, error = %failure, "worker not accepting yet");
        sleep(delay).await;
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(5);
    let millis = RECONNECT_BASE_DELAY_MS.saturating_mul(1 << exp);
    Duration::from_millis(millis.min(MAX_RECONNECT_DELAY_MS))
}

async fn write_loop(mut sink: SplitSink<WsStream, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(err) = sink.send(msg).await {
            debug!(error = %err, "rpc writer stopped");
            break;
        }
        if closing {
            break;
        }
    }
}

async fn read_loop(
    mut source: SplitStream<WsStream>,
    pending: PendingCalls,
    outgoing: mpsc::UnboundedSender<Message>,
    alive: Arc<AtomicBool>,
) {
    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => match parse_response(text.as_str()) {
                Ok(Some((id, result))) => {
                    if let Some(tx) = lock(&pending).remove(&id) {
                        let _ = tx.send(result);
                    } else {
                        debug!(id, "response for unknown call id");
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "unparseable rpc frame"),
            },
            Ok(Message::Ping(data)) => {
                let _ = outgoing.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "rpc connection error");
                break;
            }
        }
    }
    alive.store(false, Ordering::SeqCst);
    fail_pending(&pending, || {
        RpcError::Transport("connection closed by worker".to_string())
    });
}

/// Park `reply` under `id`, unless the connection died meanwhile.
///
/// The reader marks the connection dead before draining `pending`, so an
/// entry inserted while `alive` still reads true is always drained.
fn register_call(
    pending: &PendingCalls,
    alive: &AtomicBool,
    id: u64,
    reply: Reply,
) -> Result<(), RpcError> {
    lock(pending).insert(id, reply);
    if alive.load(Ordering::SeqCst) {
        return Ok(());
    }
    lock(pending).remove(&id);
    Err(RpcError::Closed)
}

fn fail_pending(pending: &PendingCalls, err: impl Fn() -> RpcError) {
    for (_, tx) in lock(pending).drain() {
        let _ = tx.send(Err(err()));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
