//! Traversal state
//!
//! Tracks, per canonical document path, the strongest elevation context the
//! document has been visited under, plus the documents currently on the
//! traversal stack. Markers only move forward: unvisited, plain, elevated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Visit marker of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VisitMarker {
    /// Never visited
    #[default]
    Unvisited,
    /// Visited without inherited elevation
    Plain,
    /// Visited with inherited elevation (terminal)
    Elevated,
}

impl VisitMarker {
    /// Marker left by a visit under the given inherited context
    #[inline]
    #[must_use]
    pub fn after_visit(inherited: bool) -> Self {
        if inherited {
            Self::Elevated
        } else {
            Self::Plain
        }
    }
}

/// Decision taken when a document is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Visit the document now
    Proceed,
    /// Already covered by an earlier visit
    Skip,
    /// Document is on the stack; any needed upgrade was queued
    Deferred,
}

#[derive(Debug, Clone, Copy)]
struct ActiveVisit {
    inherited: bool,
    upgrade_pending: bool,
}

/// Visit bookkeeping for one traversal
#[derive(Debug, Default)]
pub struct TraversalState {
    markers: HashMap<PathBuf, VisitMarker>,
    active: HashMap<PathBuf, ActiveVisit>,
}

impl TraversalState {
    /// Create empty state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current marker of a document
    #[must_use]
    pub fn marker(&self, path: &Path) -> VisitMarker {
        self.markers.get(path).copied().unwrap_or_default()
    }

    /// Number of documents with a marker
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no document has been marked yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Decide whether a document reached under `inherited` must be visited
    ///
    /// On [`Admission::Proceed`] the document is pushed on the stack and the
    /// caller must call [`TraversalState::finish`] once done.
    pub fn admit(&mut self, path: &Path, inherited: bool) -> Admission {
        if let Some(active) = self.active.get_mut(path) {
            if inherited && !active.inherited {
                active.upgrade_pending = true;
            }
            return Admission::Deferred;
        }

        match self.marker(path) {
            VisitMarker::Elevated => return Admission::Skip,
            VisitMarker::Plain if !inherited => return Admission::Skip,
            _ => {}
        }

        self.active.insert(
            path.to_path_buf(),
            ActiveVisit {
                inherited,
                upgrade_pending: false,
            },
        );
        Admission::Proceed
    }

    /// Pop a document off the stack and record its marker
    ///
    /// Returns `true` when an elevated re-entry was deferred during the visit.
    pub fn finish(&mut self, path: &Path) -> bool {
        let Some(active) = self.active.remove(path) else {
            return false;
        };
        self.mark(path, active.inherited);
        active.upgrade_pending
    }

    /// Record a visit, never lowering an existing marker
    pub fn mark(&mut self, path: &Path, inherited: bool) {
        let marker = self.markers.entry(path.to_path_buf()).or_default();
        *marker = (*marker).max(VisitMarker::after_visit(inherited));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("/work/tasks.yml")
    }

    #[test]
    fn unvisited_proceeds() {
        let mut state = TraversalState::new();
        assert_eq!(state.marker(&path()), VisitMarker::Unvisited);
        assert_eq!(state.admit(&path(), false), Admission::Proceed);
    }

    #[test]
    fn plain_visit_skips_plain_and_upgrades_elevated() {
        let mut state = TraversalState::new();
        state.admit(&path(), false);
        assert!(!state.finish(&path()));
        assert_eq!(state.marker(&path()), VisitMarker::Plain);

        assert_eq!(state.admit(&path(), false), Admission::Skip);
        assert_eq!(state.admit(&path(), true), Admission::Proceed);
        state.finish(&path());
        assert_eq!(state.marker(&path()), VisitMarker::Elevated);
    }

    #[test]
    fn elevated_is_terminal() {
        let mut state = TraversalState::new();
        state.mark(&path(), true);
        assert_eq!(state.admit(&path(), true), Admission::Skip);
        assert_eq!(state.admit(&path(), false), Admission::Skip);

        state.mark(&path(), false);
        assert_eq!(state.marker(&path()), VisitMarker::Elevated);
    }

    #[test]
    fn reentry_on_stack_is_deferred() {
        let mut state = TraversalState::new();
        assert_eq!(state.admit(&path(), false), Admission::Proceed);
        assert_eq!(state.admit(&path(), false), Admission::Deferred);
        assert!(!state.finish(&path()));
    }

    #[test]
    fn elevated_reentry_queues_upgrade() {
        let mut state = TraversalState::new();
        state.admit(&path(), false);
        assert_eq!(state.admit(&path(), true), Admission::Deferred);
        assert!(state.finish(&path()));
        assert_eq!(state.marker(&path()), VisitMarker::Plain);
    }

    #[test]
    fn markers_are_ordered() {
        assert!(VisitMarker::Unvisited < VisitMarker::Plain);
        assert!(VisitMarker::Plain < VisitMarker::Elevated);
    }
}
