//! Gateway service - runs the reload watcher next to the HTTP transport.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{TransportError, TransportResult, http::HttpTransport};
use crate::core::GatewayServer;
use crate::domains::watcher::ReloadWatcher;

/// Runs the gateway until Ctrl-C.
pub struct GatewayService {
    server: GatewayServer,
}

impl GatewayService {
    /// Create a service for an already loaded server.
    pub fn new(server: GatewayServer) -> Self {
        Self { server }
    }

    /// Log information about what is about to run.
    pub fn log_info(&self) {
        let config = self.server.config();
        info!(
            "Starting HTTP on {} with {} handlers (watcher {})",
            config.transport.address(),
            self.server.snapshot().len(),
            if config.watcher.enabled { "on" } else { "off" }
        );
    }

    /// Serve until a shutdown signal, then stop the watcher.
    ///
    /// Fails without serving when the watcher is enabled and cannot start.
    /// Otherwise this method blocks until the transport is shut down.
    pub async fn run(self) -> TransportResult<()> {
        self.log_info();

        let config = self.server.config().clone();
        let cancel = CancellationToken::new();

        let watcher = if config.watcher.enabled {
            let watcher = Arc::new(ReloadWatcher::new(
                self.server.registry().clone(),
                config.watcher.clone(),
                config.catalog.output_path.clone(),
            ));
            Some(watcher.start(cancel.clone())?)
        } else {
            None
        };

        let shutdown = {
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = cancel.cancelled() => {}
                }
            }
        };

        let served = HttpTransport::new(config.transport.clone())
            .run(self.server, shutdown)
            .await;

        cancel.cancel();
        if let Some(handle) = watcher {
            handle
                .await
                .map_err(|e| TransportError::task(e.to_string()))?;
        }

        served
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::config::HandlerSource;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unwatchable_directory_stops_serve() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.handlers.sources = vec![HandlerSource::new(dir.path().join("missing"))];
        config.watcher.enabled = true;
        config.transport.port = 0;

        let result = GatewayService::new(GatewayServer::new(config)).run().await;
        assert!(matches!(result, Err(TransportError::Watcher(_))));
    }
}
