//! The live handler registry.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{info, instrument, warn};

use super::error::RegistryError;
use super::loader;
use super::snapshot::{LoadedHandler, Snapshot};
use crate::core::config::HandlersConfig;
use crate::domains::handlers::PluginTable;

/// Registry of loaded handlers.
///
/// Readers take the current snapshot without locking and keep using it for
/// the rest of their request. `reload` builds a complete new snapshot before
/// swapping it in, so a failed reload leaves the previous snapshot serving.
pub struct HandlerRegistry {
    config: HandlersConfig,
    plugins: PluginTable,
    current: ArcSwap<Snapshot>,
    reload_lock: Mutex<()>,
}

impl HandlerRegistry {
    /// Create a registry with an empty snapshot. Call `reload` to populate it.
    pub fn new(config: HandlersConfig, plugins: PluginTable) -> Self {
        Self {
            config,
            plugins,
            current: ArcSwap::from_pointee(Snapshot::empty()),
            reload_lock: Mutex::new(()),
        }
    }

    /// The snapshot currently serving requests.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Look up a handler in the current snapshot.
    pub fn get(&self, name: &str) -> Option<Arc<LoadedHandler>> {
        self.current.load().get(name).cloned()
    }

    /// The discovery configuration.
    pub fn config(&self) -> &HandlersConfig {
        &self.config
    }

    /// The compiled handlers manifests may bind to.
    pub fn plugins(&self) -> &PluginTable {
        &self.plugins
    }

    /// Rescan the handler directories and swap in the result.
    ///
    /// On error the current snapshot stays in place.
    #[instrument(skip(self))]
    pub fn reload(&self) -> Result<Arc<Snapshot>, RegistryError> {
        // One reload at a time.
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let generation = self.current.load().generation() + 1;

        match loader::load(&self.config, &self.plugins) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot.with_generation(generation));
                self.current.store(snapshot.clone());
                info!(
                    generation,
                    handlers = snapshot.len(),
                    "Registry snapshot swapped in"
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(
                    generation = generation - 1,
                    "Reload failed, keeping current snapshot: {}", e
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("HandlerRegistry")
            .field("sources", &self.config.sources)
            .field("generation", &snapshot.generation())
            .field("handlers", &snapshot.names())
            .finish()
    }
}
