//! Handlers domain module.
//!
//! ## Architecture
//!
//! - `contract.rs` - The `Handler` trait every compiled handler implements
//! - `plugins.rs` - The explicit table of compiled handlers manifests bind to
//! - `definitions/` - Built-in handler implementations (one file per handler)
//! - `error.rs` - Handler error types

mod contract;
pub mod definitions;
mod error;
mod plugins;

pub use contract::{ErasedHandler, Handler};
pub use error::{HandlerError, InvokeError};
pub use plugins::PluginTable;
