//! Reload watcher.
//!
//! Watches the handler directories and, after a debounced burst of changes
//! to handler manifests, rebuilds the registry snapshot and regenerates the
//! catalog file. The process keeps serving throughout: requests in flight
//! finish on the snapshot they started with.

mod error;

pub use error::WatcherError;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::core::config::WatcherConfig;
use crate::domains::registry::{HandlerRegistry, Snapshot, is_handler_source};

/// How often the event loop checks for cancellation.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of the watcher, published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Waiting for filesystem events.
    Idle,
    /// A qualifying change arrived; a reload is about to start.
    ChangeDetected,
    /// The registry is being rebuilt.
    Reloading,
}

/// Debounced filesystem watcher driving registry reloads.
pub struct ReloadWatcher {
    registry: Arc<HandlerRegistry>,
    config: WatcherConfig,
    catalog_path: Option<PathBuf>,
    state: watch::Sender<WatcherState>,
}

impl ReloadWatcher {
    /// Create a watcher for the registry's handler directories.
    ///
    /// When `catalog_path` is set, the catalog is rewritten after each
    /// successful reload.
    pub fn new(
        registry: Arc<HandlerRegistry>,
        config: WatcherConfig,
        catalog_path: Option<PathBuf>,
    ) -> Self {
        let (state, _) = watch::channel(WatcherState::Idle);
        Self {
            registry,
            config,
            catalog_path,
            state,
        }
    }

    /// Receive state transitions.
    pub fn subscribe(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }

    /// The current state.
    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// React to a batch of changed paths.
    ///
    /// Returns whether the batch qualified and a reload was attempted.
    pub fn handle_changes(&self, paths: &[PathBuf]) -> bool {
        let changed: Vec<&Path> = paths
            .iter()
            .map(PathBuf::as_path)
            .filter(|path| is_handler_source(path))
            .collect();

        if changed.is_empty() {
            return false;
        }

        self.state.send_replace(WatcherState::ChangeDetected);
        info!("Handler change detected: {:?}", changed);

        self.state.send_replace(WatcherState::Reloading);
        match self.registry.reload() {
            Ok(snapshot) => self.write_catalog(&snapshot),
            Err(e) => error!("Reload failed, previous handlers stay live: {}", e),
        }
        self.state.send_replace(WatcherState::Idle);

        true
    }

    fn write_catalog(&self, snapshot: &Snapshot) {
        let Some(path) = &self.catalog_path else {
            return;
        };

        let written = snapshot
            .catalog()
            .map_err(|e| e.to_string())
            .and_then(|catalog| catalog.write_to(path).map_err(|e| e.to_string()));

        match written {
            Ok(()) => info!("Catalog written to {}", path.display()),
            Err(e) => error!("Failed to write catalog to {}: {}", path.display(), e),
        }
    }

    /// Register every handler directory, then run the event loop on the
    /// blocking pool until `cancel` fires.
    ///
    /// Fails before anything is spawned when the watcher cannot be created or
    /// any directory cannot be watched.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> Result<JoinHandle<()>, WatcherError> {
        let (tx, rx) = channel::<DebounceEventResult>();
        let mut debouncer = new_debouncer(self.config.debounce(), tx).map_err(WatcherError::Create)?;

        let mode = if self.registry.config().recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        for source in &self.registry.config().sources {
            debouncer
                .watcher()
                .watch(&source.dir, mode)
                .map_err(|e| WatcherError::watch(&source.dir, e))?;
            info!("Watching {}", source.dir.display());
        }

        Ok(tokio::task::spawn_blocking(move || {
            self.run(&rx, &cancel);
            // Watching stops here.
            drop(debouncer);
        }))
    }

    fn run(&self, rx: &Receiver<DebounceEventResult>, cancel: &CancellationToken) {
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(events)) => {
                    let paths: Vec<PathBuf> = events.into_iter().map(|event| event.path).collect();
                    debug!("{} debounced filesystem events", paths.len());
                    self.handle_changes(&paths);
                }
                Ok(Err(e)) => error!("Watcher error: {:?}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Watcher channel closed");
                    break;
                }
            }

            if cancel.is_cancelled() {
                info!("Watcher stopped");
                break;
            }
        }
    }
}
