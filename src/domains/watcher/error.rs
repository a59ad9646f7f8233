//! Watcher error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while setting up filesystem watching.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The platform watcher could not be created.
    #[error("Cannot create file watcher: {0}")]
    Create(#[source] notify::Error),

    /// A handler directory could not be registered.
    #[error("Cannot watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl WatcherError {
    /// Create a watch registration error.
    pub fn watch(path: &Path, source: notify::Error) -> Self {
        Self::Watch {
            path: path.to_path_buf(),
            source,
        }
    }
}
