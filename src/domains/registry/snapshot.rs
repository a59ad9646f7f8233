//! Immutable registry snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domains::handlers::ErasedHandler;
use crate::domains::schema::{Catalog, ExtractionError, FunctionDescription};

/// How a loaded handler is invoked.
#[derive(Clone)]
pub enum Invoker {
    /// A compiled handler from the plugin table.
    Builtin(Arc<dyn ErasedHandler>),

    /// An external process speaking JSON over stdin/stdout.
    Command(CommandSpec),
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(plugin) => f.debug_tuple("Builtin").field(&plugin.name()).finish(),
            Self::Command(spec) => f.debug_tuple("Command").field(spec).finish(),
        }
    }
}

/// An external handler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// The directory containing the manifest.
    pub working_dir: PathBuf,
}

/// A handler ready to be dispatched to.
#[derive(Debug, Clone)]
pub struct LoadedHandler {
    pub name: String,
    /// The manifest this handler was loaded from.
    pub source: PathBuf,
    pub description: FunctionDescription,
    pub invoker: Invoker,
    /// Overrides the dispatcher's default timeout.
    pub timeout: Option<Duration>,
}

/// Point-in-time name -> handler mapping.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    handlers: BTreeMap<String, Arc<LoadedHandler>>,
    generation: u64,
}

impl Snapshot {
    /// A snapshot with no handlers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_handlers(handlers: Vec<LoadedHandler>) -> Self {
        Self {
            handlers: handlers
                .into_iter()
                .map(|handler| (handler.name.clone(), Arc::new(handler)))
                .collect(),
            generation: 0,
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Look up a handler by exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<LoadedHandler>> {
        self.handlers.get(name)
    }

    /// Handler names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the snapshot has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// How many successful reloads produced this snapshot (0 = never loaded).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The catalog of this snapshot's handlers.
    pub fn catalog(&self) -> Result<Catalog, ExtractionError> {
        Catalog::new(
            self.handlers
                .values()
                .map(|handler| handler.description.clone())
                .collect(),
        )
    }
}
