//! Name-keyed application registry and resolution.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use super::{
    builtin_descriptor, AppDescriptor, AppPlugin, BuiltinApp, DescriptorApp, BUILTIN_APP_KEY,
    RESERVED_APP_NAME,
};
use crate::config::{ConnectionParams, ResolvedConfig};
use crate::error::{AppError, ConfigError};
use crate::rpc::RpcClient;

/// Builds an application from its descriptor and a bound client.
pub type AppFactory = fn(AppDescriptor, Arc<dyn RpcClient>) -> Arc<dyn AppPlugin>;

/// Builds the RPC client an application is bound to.
pub type ClientFactory = Box<dyn Fn(&ConnectionParams) -> Arc<dyn RpcClient> + Send + Sync>;

/// Dedicated implementations keyed by application name.
#[derive(Default)]
pub struct AppRegistry {
    factories: BTreeMap<String, AppFactory>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: AppFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn factory(&self, name: &str) -> Option<AppFactory> {
        self.factories.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

/// The one application instance bound for this process.
#[derive(Clone)]
pub struct AppBinding {
    pub plugin: Arc<dyn AppPlugin>,
    pub descriptor: AppDescriptor,
}

impl AppBinding {
    pub fn is_builtin(&self) -> bool {
        self.descriptor.app_name == RESERVED_APP_NAME
    }
}

/// Resolves a requested name into an [`AppBinding`].
pub struct AppResolver {
    registry: AppRegistry,
    apps_dir: PathBuf,
    base_dir: PathBuf,
    client_factory: ClientFactory,
}

impl AppResolver {
    /// `apps_dir` is searched for descriptors; `base_dir` becomes the
    /// built-in app's artifact and condition directory.
    pub fn new(
        registry: AppRegistry,
        apps_dir: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
        client_factory: ClientFactory,
    ) -> Self {
        Self {
            registry,
            apps_dir: apps_dir.into(),
            base_dir: base_dir.into(),
            client_factory,
        }
    }

    /// Location of the descriptor for `name`.
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.apps_dir.join(name).join(format!("{name}.json"))
    }

    /// Select and construct the application. Descriptor validation happens
    /// before any client is built, so a rejected name never reaches RPC.
    pub fn resolve(&self, requested: &str, config: &ResolvedConfig) -> Result<AppBinding, AppError> {
        if requested == BUILTIN_APP_KEY {
            let descriptor = builtin_descriptor(config, &self.base_dir);
            let client = (self.client_factory)(&config.connection());
            let plugin: Arc<dyn AppPlugin> = Arc::new(BuiltinApp::new(descriptor.clone(), client));
            info!(app = RESERVED_APP_NAME, "using built-in app");
            return Ok(AppBinding { plugin, descriptor });
        }

        let descriptor = self.discover(requested)?;
        let client = (self.client_factory)(&config.connection());
        let plugin = match self.registry.factory(requested) {
            Some(factory) => factory(descriptor.clone(), client),
            None => Arc::new(DescriptorApp::new(descriptor.clone(), client)) as Arc<dyn AppPlugin>,
        };
        info!(app = %descriptor.app_name, requested, "resolved app");
        Ok(AppBinding { plugin, descriptor })
    }

    fn discover(&self, requested: &str) -> Result<AppDescriptor, AppError> {
        let path = self.descriptor_path(requested);
        let descriptor = read_descriptor(&path).map_err(|err| match err {
            ConfigError::Io(io) if io.kind() == ErrorKind::NotFound => AppError::NotFound {
                requested: requested.to_string(),
                path: path.clone(),
            },
            other => AppError::Descriptor(other),
        })?;
        if descriptor.app_name == RESERVED_APP_NAME {
            return Err(AppError::ReservedName {
                requested: requested.to_string(),
                app_name: descriptor.app_name,
            });
        }
        Ok(descriptor)
    }
}

fn read_descriptor(path: &Path) -> Result<AppDescriptor, ConfigError> {
    AppDescriptor::from_file(path, |p| std::fs::read_to_string(p))
}
