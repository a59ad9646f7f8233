//! Function Gateway Library
//!
//! This crate exposes a directory of handlers to tool-calling agents: it
//! publishes a catalog of their function descriptions and serves each one at
//! `POST /{handler}`, reloading the registry whenever the directory changes.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the gateway server and the HTTP
//!   transport
//! - **domains**: business logic organized by bounded contexts
//!   - **handlers**: the handler contract and the compiled plugins
//!   - **schema**: extraction of function descriptions and the catalog
//!   - **registry**: manifest discovery, loading and snapshot publication
//!   - **dispatch**: validation, invocation and error classification
//!   - **watcher**: debounced reloads on filesystem changes
//!
//! # Example
//!
//! ```rust,no_run
//! use function_gateway::{Config, GatewayServer, core::GatewayService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let server = GatewayServer::new(config);
//!     server.reload()?;
//!     GatewayService::new(server).run().await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, GatewayServer, Result};
