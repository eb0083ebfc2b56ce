//! Application binding.
//!
//! An application is selected by name once at startup. The reserved key
//! `11be` selects the built-in application; any other name is looked up under
//! the applications directory (`<dir>/<name>/<name>.json`) and bound to an
//! implementation from the [`AppRegistry`], falling back to the generic
//! descriptor-driven application.

mod builtin;
mod dapp;
mod descriptor;
mod registry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, RpcError};
use crate::rpc::RpcClient;

pub use builtin::{builtin_descriptor, BuiltinApp, BUILTIN_VERSION};
pub use dapp::DescriptorApp;
pub use descriptor::AppDescriptor;
pub use registry::{AppBinding, AppFactory, AppRegistry, AppResolver, ClientFactory};

/// CLI key that selects the built-in application.
pub const BUILTIN_APP_KEY: &str = "11be";

/// `appName` owned by the built-in application. No discovered app may use it.
pub const RESERVED_APP_NAME: &str = "be";

/// Capability surface every application exposes to the pipeline and shell.
#[async_trait]
pub trait AppPlugin: Send + Sync {
    fn descriptor(&self) -> &AppDescriptor;

    /// RPC client bound to the worker endpoint.
    fn client(&self) -> Arc<dyn RpcClient>;

    /// Establish the RPC connection.
    async fn connect_rpc(&self) -> Result<(), RpcError> {
        self.client().connect().await
    }

    /// Application-specific startup, run once after configuration/unlock.
    async fn init(&self) -> Result<(), AppError>;
}
