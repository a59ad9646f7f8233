//! Handler registry domain.
//!
//! Discovers handler manifests, binds each to a compiled plugin or an
//! external command, and keeps the resulting name -> handler mapping in an
//! atomically swapped snapshot.
//!
//! ## Adding a handler
//!
//! Drop a `*.toml` manifest into a handler directory. The handler's name is
//! the file stem (plus `-tag` for tagged directories):
//!
//! ```toml
//! description = "Greet person by name"
//!
//! [invoke]
//! builtin = "greet"
//! ```

mod error;
mod loader;
mod manifest;
mod snapshot;
mod store;

pub use error::RegistryError;
pub use loader::{Candidate, HANDLER_EXTENSION, discover, handler_name, is_handler_source, load};
pub use manifest::{InvokeSection, Manifest, SCAFFOLD_TEMPLATE};
pub use snapshot::{CommandSpec, Invoker, LoadedHandler, Snapshot};
pub use store::HandlerRegistry;
