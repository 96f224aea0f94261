//! Injection run configuration

use raa_document::store::DEFAULT_MAX_FILE_SIZE;
use std::path::{Path, PathBuf};

/// Extensions of documents discovered under the root
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Configuration of one injection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectConfig {
    /// Directory (or single playbook) to traverse
    pub root: PathBuf,
    /// File extensions treated as documents
    pub extensions: Vec<String>,
    /// Largest document the store will load
    pub max_file_size: usize,
    /// Descend into symlinked directories during discovery
    pub follow_links: bool,
}

impl InjectConfig {
    /// Create configuration for a root with default settings
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            follow_links: false,
        }
    }

    /// Replace the document extensions
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the document size limit
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Follow symlinks during discovery
    #[must_use]
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Whether a path carries one of the document extensions
    #[must_use]
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}
