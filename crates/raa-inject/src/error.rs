//! Error types for the injection traversal
//!
//! Only conditions that abort a run live here. Unreadable documents, missing
//! targets and templated references are handled inside the traversal.

use raa_document::DocumentError;
use std::path::PathBuf;

/// Errors that abort an injection run
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Traversal root does not exist
    #[error("traversal root not found: {path}")]
    RootNotFound {
        /// Root as given by the caller
        path: PathBuf,
        /// Resolution failure
        #[source]
        source: std::io::Error,
    },

    /// Walking the root directory failed
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Root being walked
        path: PathBuf,
        /// Underlying walk failure
        #[source]
        source: walkdir::Error,
    },

    /// A mutated document could not be written back
    #[error("failed to persist {path}: {source}")]
    Persist {
        /// Document being written
        path: PathBuf,
        /// Underlying store failure
        #[source]
        source: DocumentError,
    },
}

impl InjectError {
    /// Create persist error for path
    pub fn persist(path: impl Into<PathBuf>, source: DocumentError) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for injection operations
pub type InjectResult<T> = Result<T, InjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_error_display() {
        let source = DocumentError::io_error(
            "/ro/tasks.yml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let err = InjectError::persist("/ro/tasks.yml", source);
        assert_eq!(
            err.to_string(),
            "failed to persist /ro/tasks.yml: io error on /ro/tasks.yml: denied"
        );
    }

    #[test]
    fn root_not_found_display() {
        let err = InjectError::RootNotFound {
            path: PathBuf::from("build"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "traversal root not found: build");
    }
}
