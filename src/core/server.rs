//! Gateway server state and lifecycle.
//!
//! `GatewayServer` ties the registry and the dispatcher to one
//! configuration. It is cheap to clone and is what the HTTP transport holds
//! as its state.
//!
//! ## Handler Architecture
//!
//! Compiled handlers live in `domains/handlers/definitions/` with one file
//! per handler and are registered in `PluginTable::builtin()`. Manifests in
//! the handler directories bind names to them (or to external commands).
//! **Adding a handler does NOT require modifying this file!**

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::config::Config;
use super::error::Result;
use crate::domains::dispatch::{DispatchError, Dispatcher};
use crate::domains::handlers::PluginTable;
use crate::domains::registry::{HandlerRegistry, Snapshot};
use crate::domains::schema::Catalog;

/// The gateway: configuration, live registry and dispatcher.
#[derive(Debug, Clone)]
pub struct GatewayServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The live handler registry.
    registry: Arc<HandlerRegistry>,

    /// Routes requests into the registry.
    dispatcher: Dispatcher,
}

impl GatewayServer {
    /// Create a gateway serving the built-in plugins.
    pub fn new(config: Config) -> Self {
        Self::with_plugins(config, PluginTable::builtin())
    }

    /// Create a gateway with an explicit plugin table.
    pub fn with_plugins(config: Config, plugins: PluginTable) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(HandlerRegistry::new(config.handlers.clone(), plugins));
        let dispatcher = Dispatcher::new(registry.clone(), config.dispatch.timeout());

        Self {
            config,
            registry,
            dispatcher,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the handler registry.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// The snapshot currently serving requests.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.registry.snapshot()
    }

    /// Load (or reload) every handler directory.
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<Arc<Snapshot>> {
        Ok(self.registry.reload()?)
    }

    /// Dispatch a raw request body to the named handler.
    pub async fn dispatch(&self, name: &str, body: &[u8]) -> std::result::Result<Value, DispatchError> {
        self.dispatcher.dispatch(name, body).await
    }

    /// The catalog of the live snapshot.
    pub fn catalog(&self) -> Result<Catalog> {
        Ok(self.registry.snapshot().catalog()?)
    }

    /// Write the catalog of the live snapshot to `path`.
    pub fn write_catalog(&self, path: &Path) -> Result<()> {
        let catalog = self.catalog()?;
        catalog.write_to(path)?;
        info!("Catalog of {} functions written to {}", catalog.len(), path.display());
        Ok(())
    }
}
