//! Summary of an injection run

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Counters collected during one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InjectReport {
    /// Documents found under the root
    pub discovered: usize,
    /// Document visits, re-scans after an upgrade included
    pub visits: usize,
    /// Documents written back
    pub written: usize,
    /// Identity tags injected
    pub tagged: usize,
    /// Documents skipped because they could not be loaded
    pub skipped: usize,
}

impl InjectReport {
    /// Whether the run changed anything on disk
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.written == 0
    }
}

impl Display for InjectReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents, {} visits, {} written, {} tasks tagged, {} skipped",
            self.discovered, self.visits, self.written, self.tagged, self.skipped
        )
    }
}
