//! The capability catalog handed to tool-calling agents.

use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use super::error::ExtractionError;
use super::types::FunctionDescription;

/// Function descriptions of every discovered handler, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    functions: Vec<FunctionDescription>,
}

impl Catalog {
    /// Build a catalog, rejecting names that collide (case-insensitively).
    pub fn new(mut functions: Vec<FunctionDescription>) -> Result<Self, ExtractionError> {
        functions.sort_by(|a, b| a.name.cmp(&b.name));

        let mut seen = HashSet::new();
        for function in &functions {
            if !seen.insert(function.name.to_lowercase()) {
                return Err(ExtractionError::DuplicateName {
                    name: function.name.clone(),
                });
            }
        }

        Ok(Self { functions })
    }

    /// The descriptions, in catalog order.
    pub fn functions(&self) -> &[FunctionDescription] {
        &self.functions
    }

    /// Number of functions in the catalog.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Render the catalog as a pretty-printed JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the catalog to `path`, replacing the file atomically.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        fs::write(&tmp, json + "\n")?;
        fs::rename(&tmp, path)
    }
}
