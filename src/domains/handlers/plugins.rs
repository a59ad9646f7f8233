//! Plugin table - the explicit list of compiled handlers.
//!
//! Manifests never load code; they bind to one of the handlers registered
//! here by key. When adding a new handler, register it in `builtin()`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::contract::{ErasedHandler, Handler};
use super::definitions::{GreetHandler, KelvinToCelsiusHandler, MultiplyMatricesHandler};

/// Compiled handlers keyed by their plugin name.
#[derive(Clone, Default)]
pub struct PluginTable {
    plugins: BTreeMap<&'static str, Arc<dyn ErasedHandler>>,
}

impl PluginTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of every handler shipped with this crate.
    pub fn builtin() -> Self {
        Self::new()
            .with(GreetHandler)
            .with(KelvinToCelsiusHandler)
            .with(MultiplyMatricesHandler)
    }

    /// Register a handler, replacing any previous one with the same key.
    pub fn with<H: Handler>(mut self, handler: H) -> Self {
        self.plugins.insert(H::NAME, Arc::new(handler));
        self
    }

    /// Look up a handler by key.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ErasedHandler>> {
        self.plugins.get(name).cloned()
    }

    /// All registered keys, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }
}

impl fmt::Debug for PluginTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginTable")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let table = PluginTable::builtin();
        assert_eq!(
            table.names(),
            vec!["greet", "kelvin_to_celsius", "multiply_matrices"]
        );
    }

    #[test]
    fn test_lookup() {
        let table = PluginTable::builtin();
        assert!(table.get("greet").is_some());
        assert!(table.get("missing").is_none());
    }
}
