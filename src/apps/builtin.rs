//! Built-in application: a read-only console over the worker.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{AppDescriptor, AppPlugin, RESERVED_APP_NAME};
use crate::config::ResolvedConfig;
use crate::error::AppError;
use crate::rpc::RpcClient;

/// Version reported by the built-in descriptor.
pub const BUILTIN_VERSION: &str = "1.0";

/// Descriptor synthesized from configuration: no contracts, no credential.
pub fn builtin_descriptor(config: &ResolvedConfig, base_dir: &Path) -> AppDescriptor {
    AppDescriptor {
        contracts: Some(Value::Array(Vec::new())),
        network_id: Some(config.network_id()),
        version: Some(Value::from(BUILTIN_VERSION)),
        ..AppDescriptor::new(RESERVED_APP_NAME, base_dir, base_dir)
    }
}

pub struct BuiltinApp {
    descriptor: AppDescriptor,
    client: Arc<dyn RpcClient>,
}

impl BuiltinApp {
    pub fn new(descriptor: AppDescriptor, client: Arc<dyn RpcClient>) -> Self {
        Self { descriptor, client }
    }
}

#[async_trait]
impl AppPlugin for BuiltinApp {
    fn descriptor(&self) -> &AppDescriptor {
        &self.descriptor
    }

    fn client(&self) -> Arc<dyn RpcClient> {
        self.client.clone()
    }

    /// Nothing to load: the built-in console has no artifacts of its own.
    async fn init(&self) -> Result<(), AppError> {
        debug!("built-in app has nothing to initialize");
        Ok(())
    }
}
