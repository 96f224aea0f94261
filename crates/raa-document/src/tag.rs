//! Identity tags injected into `become_flags`
//!
//! A tag is rendered as `-r <location> -t <instance>`: the location is the
//! document path relative to the traversal root (stable across runs), the
//! instance is a fresh UUID per injection.

use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Flag carrying the location identifier
pub const LOCATION_FLAG: &str = "-r";

/// Flag carrying the instance identifier
pub const INSTANCE_FLAG: &str = "-t";

/// `(location, instance)` pair correlating a task with generated policy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityTag {
    location: String,
    instance: String,
}

impl IdentityTag {
    /// Create tag from explicit components
    #[inline]
    #[must_use]
    pub fn new(location: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            instance: instance.into(),
        }
    }

    /// Create tag for a location with a freshly generated instance id
    #[inline]
    #[must_use]
    pub fn generate(location: impl Into<String>) -> Self {
        Self::new(location, Uuid::new_v4().to_string())
    }

    /// Location identifier (document path relative to the root)
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Instance identifier
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Whether a flags string already carries both tag components
    ///
    /// Substring detection, kept compatible with flags written by earlier
    /// runs of the tool.
    #[must_use]
    pub fn is_tagged(flags: &str) -> bool {
        flags.contains("-r ") && flags.contains("-t ")
    }

    /// Append this tag to an existing flags string
    #[must_use]
    pub fn append_to(&self, flags: &str) -> String {
        format!("{flags} {self}").trim().to_string()
    }

    /// Extract a tag from a flags string
    ///
    /// Returns `None` unless both flags are present with a value.
    #[must_use]
    pub fn parse(flags: &str) -> Option<Self> {
        let mut location = None;
        let mut instance = None;
        let mut words = flags.split_whitespace();
        while let Some(word) = words.next() {
            match word {
                LOCATION_FLAG => location = words.next(),
                INSTANCE_FLAG => instance = words.next(),
                _ => {}
            }
        }
        Some(Self::new(location?, instance?))
    }
}

impl Display for IdentityTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{LOCATION_FLAG} {} {INSTANCE_FLAG} {}",
            self.location, self.instance
        )
    }
}
