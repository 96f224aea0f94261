//! Error types for become command builders

/// Errors while building a become command line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BecomeError {
    /// Command has an unterminated quote or a trailing backslash
    #[error("cannot split command into arguments: {0}")]
    Unsplittable(String),
}

/// Result type alias for become operations
pub type BecomeResult<T> = Result<T, BecomeError>;
