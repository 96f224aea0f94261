//! Error types for policy merging

use std::path::PathBuf;

/// Errors while merging policies
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// IO error on a policy file
    #[error("io error on {path}: {source}")]
    Io {
        /// Policy file
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Policy file is not valid JSON
    #[error("invalid policy {path}: {source}")]
    Json {
        /// Policy file
        path: PathBuf,
        /// Underlying JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// Policy has no `roles` array
    #[error("{0} policy has no roles array")]
    Shape(&'static str),
}

impl PolicyError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_display() {
        assert_eq!(
            PolicyError::Shape("generated").to_string(),
            "generated policy has no roles array"
        );
    }
}
