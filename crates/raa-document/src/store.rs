//! Document store
//!
//! Loads YAML documents into `serde_yaml::Value` trees and writes them back
//! in block style. `serde_yaml` mappings keep insertion order, so a rewrite
//! only differs from the input where a task was mutated (plus whatever
//! normalisation the emitter applies to quoting and comments).

use crate::error::{DocumentError, DocumentResult};
use serde_yaml::Value;
use std::path::Path;

/// Default upper bound on the size of a loaded document (10MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// File-backed YAML document store
///
/// Stateless apart from its limits; the traversal decides when to save.
#[derive(Debug, Clone, Copy)]
pub struct DocumentStore {
    max_file_size: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create store with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_file_size(DEFAULT_MAX_FILE_SIZE)
    }

    /// Create store with a specific size limit
    #[inline]
    #[must_use]
    pub fn with_max_file_size(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Load a document
    ///
    /// Empty or whitespace-only files load as [`Value::Null`].
    ///
    /// # Errors
    /// - `DocumentError::Io` if the file cannot be read
    /// - `DocumentError::TooLarge` if the file exceeds the size limit
    /// - `DocumentError::Syntax` if the content is not a single YAML document
    pub fn load(&self, path: impl AsRef<Path>) -> DocumentResult<Value> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| DocumentError::io_error(path, e))?;

        if content.len() > self.max_file_size {
            return Err(DocumentError::TooLarge {
                path: path.to_path_buf(),
                size: content.len(),
                max: self.max_file_size,
            });
        }

        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_yaml::from_str(&content).map_err(|e| DocumentError::syntax_error(path, e))
    }

    /// Write a document back to disk
    ///
    /// # Errors
    /// - `DocumentError::Serialize` if the tree cannot be rendered
    /// - `DocumentError::Io` if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>, document: &Value) -> DocumentResult<()> {
        let path = path.as_ref();
        let rendered = serde_yaml::to_string(document).map_err(|source| {
            DocumentError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        })?;

        std::fs::write(path, rendered).map_err(|e| DocumentError::io_error(path, e))?;
        tracing::debug!(path = %path.display(), "document saved");
        Ok(())
    }
}
