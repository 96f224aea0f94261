//! Error types for the document store
//!
//! Covers the two I/O edges of a traversal:
//! - Load (file → YAML tree)
//! - Save (YAML tree → file)

use std::path::{Path, PathBuf};

/// Errors raised while loading or persisting a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// IO error during file read or write
    #[error("io error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid YAML
    #[error("syntax error in {path}: {source}")]
    Syntax {
        /// File being parsed
        path: PathBuf,
        /// Underlying YAML failure
        #[source]
        source: serde_yaml::Error,
    },

    /// File exceeds the store's size limit
    #[error("file too large: {path} is {size} bytes (max: {max})")]
    TooLarge {
        /// Offending file
        path: PathBuf,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// In-memory tree could not be rendered back to YAML
    #[error("serialization failed for {path}: {source}")]
    Serialize {
        /// File the tree was meant for
        path: PathBuf,
        /// Underlying YAML failure
        #[source]
        source: serde_yaml::Error,
    },
}

impl DocumentError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for path
    pub fn syntax_error(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Syntax {
            path: path.into(),
            source,
        }
    }

    /// Path the error refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Syntax { path, .. }
            | Self::TooLarge { path, .. }
            | Self::Serialize { path, .. } => path,
        }
    }
}

/// Result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
