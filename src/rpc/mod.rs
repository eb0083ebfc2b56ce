//! RPC client contract and the websocket JSON-RPC transport.
//!
//! The console never talks to the worker except through [`RpcClient`]; the
//! pipeline, plugins and shell all hold it behind an `Arc<dyn RpcClient>` so
//! tests can substitute a recording fake.

pub mod protocol;
pub mod ws;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

pub use ws::WsRpcClient;

/// Method that receives the whole merged configuration in one round trip.
pub const METHOD_FULLY_INITIALIZE: &str = "fully_initialize";
/// Method that unlocks the application credential; answers a boolean.
pub const METHOD_UNLOCK: &str = "unlock";
/// Method the descriptor-driven application uses to load its artifacts.
pub const METHOD_LOAD_APP: &str = "load_app";

/// Minimal remote-procedure-call client surface.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Establish the connection. Resolves once the peer accepted it.
    async fn connect(&self) -> Result<(), RpcError>;

    /// Issue one call and wait for its result.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Close the connection. Pending calls resolve with [`RpcError::Closed`].
    async fn close(&self) -> Result<(), RpcError>;

    /// Whether `connect` succeeded and `close` has not run yet.
    fn is_connected(&self) -> bool;
}
