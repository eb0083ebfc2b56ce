//! Generic descriptor-driven application.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::{AppDescriptor, AppPlugin};
use crate::error::AppError;
use crate::rpc::{RpcClient, METHOD_LOAD_APP};

/// Application whose whole startup is "ask the worker to load my
/// artifacts and conditions". Used when no dedicated implementation is
/// registered for a discovered name.
pub struct DescriptorApp {
    descriptor: AppDescriptor,
    client: Arc<dyn RpcClient>,
}

impl DescriptorApp {
    pub fn new(descriptor: AppDescriptor, client: Arc<dyn RpcClient>) -> Self {
        Self { descriptor, client }
    }
}

#[async_trait]
impl AppPlugin for DescriptorApp {
    fn descriptor(&self) -> &AppDescriptor {
        &self.descriptor
    }

    fn client(&self) -> Arc<dyn RpcClient> {
        self.client.clone()
    }

    async fn init(&self) -> Result<(), AppError> {
        let payload = json!([self.descriptor.to_value()]);
        self.client.call(METHOD_LOAD_APP, payload).await?;
        info!(app = %self.descriptor.app_name, "application loaded");
        Ok(())
    }
}
