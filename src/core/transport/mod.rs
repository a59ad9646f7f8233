//! HTTP transport for the gateway.
//!
//! - **http**: axum router exposing `POST /{handler}` and the operational
//!   endpoints
//! - **service**: runs the router and the reload watcher together, with
//!   graceful shutdown

mod config;
mod error;
mod service;

pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use service::GatewayService;
