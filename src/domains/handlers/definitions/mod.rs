//! Built-in handler definitions.
//!
//! Each handler lives in its own file with its request type, response type
//! and `Handler` implementation.
//!
//! ## Adding a New Handler
//!
//! 1. Create a new file (e.g., `my_handler.rs`)
//! 2. Implement the `Handler` trait
//! 3. Export it here
//! 4. Register it in `plugins.rs`
//! 5. Bind it from a manifest: `[invoke] builtin = "my_handler"`

pub mod greet;
pub mod kelvin_to_celsius;
pub mod multiply_matrices;

pub use greet::{GreetHandler, GreetRequest, GreetResponse};
pub use kelvin_to_celsius::KelvinToCelsiusHandler;
pub use multiply_matrices::MultiplyMatricesHandler;
