//! Become-context propagation
//!
//! Depth-first walk over playbooks, task files and roles. Each document is
//! loaded when visited, mutated in memory and written back once at the end
//! of the visit if a task changed. The elevation context a document is
//! reached under decides which of its tasks get tagged; a document first
//! reached without elevation is re-scanned when later reached with it.

use crate::config::InjectConfig;
use crate::error::{InjectError, InjectResult};
use crate::report::InjectReport;
use crate::resolver::Resolver;
use crate::state::{Admission, TraversalState};
use raa_document::model::{self, keys};
use raa_document::{DocumentKind, DocumentStore, Value};
use std::path::{Path, PathBuf};

/// Document being visited: where its references resolve from and the
/// location identifier its tags carry
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) dir: &'a Path,
    pub(crate) location: &'a str,
}

/// Traversal over one root
///
/// Owns the traversal state; use one injector per run.
#[derive(Debug)]
pub struct Injector {
    pub(crate) resolver: Resolver,
    store: DocumentStore,
    state: TraversalState,
    pub(crate) report: InjectReport,
}

impl Injector {
    /// Create injector for the configured root
    ///
    /// When the root is a single playbook, its directory becomes the
    /// traversal root.
    ///
    /// # Errors
    /// `InjectError::RootNotFound` if the root cannot be resolved
    pub fn new(config: &InjectConfig) -> InjectResult<Self> {
        let root = std::fs::canonicalize(&config.root).map_err(|source| {
            InjectError::RootNotFound {
                path: config.root.clone(),
                source,
            }
        })?;
        let root = if root.is_file() {
            root.parent().map_or_else(|| root.clone(), Path::to_path_buf)
        } else {
            root
        };

        Ok(Self {
            resolver: Resolver::new(root),
            store: DocumentStore::with_max_file_size(config.max_file_size),
            state: TraversalState::new(),
            report: InjectReport::default(),
        })
    }

    /// Canonical traversal root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Visit bookkeeping so far
    #[inline]
    #[must_use]
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Counters so far
    #[inline]
    #[must_use]
    pub fn report(&self) -> &InjectReport {
        &self.report
    }

    /// Finish the run
    #[inline]
    #[must_use]
    pub fn into_report(self) -> InjectReport {
        self.report
    }

    /// Visit a document under an inherited elevation context
    ///
    /// Missing documents are ignored. Documents that fail to load are logged
    /// and skipped.
    ///
    /// # Errors
    /// `InjectError::Persist` if a mutated document cannot be written
    pub fn visit(&mut self, path: &Path, inherited: bool) -> InjectResult<()> {
        let Ok(path) = std::fs::canonicalize(path) else {
            tracing::debug!(path = %path.display(), "reference target missing, ignored");
            return Ok(());
        };

        match self.state.admit(&path, inherited) {
            Admission::Proceed => {}
            Admission::Skip => return Ok(()),
            Admission::Deferred => {
                tracing::debug!(path = %path.display(), inherited, "cyclic reference deferred");
                return Ok(());
            }
        }

        let outcome = self.process(&path, inherited);
        let upgrade = self.state.finish(&path);
        outcome?;

        if upgrade {
            tracing::debug!(path = %path.display(), "re-scanning with elevation");
            self.visit(&path, true)?;
        }
        Ok(())
    }

    fn process(&mut self, path: &Path, inherited: bool) -> InjectResult<()> {
        self.report.visits += 1;
        tracing::debug!(path = %path.display(), inherited, "visiting document");

        let mut document = match self.store.load(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                self.report.skipped += 1;
                return Ok(());
            }
        };

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let location = self.resolver.location_of(path);
        let scope = Scope {
            dir: &dir,
            location: &location,
        };

        let kind = DocumentKind::classify(&document);
        let dirty = match (kind, document.as_sequence_mut()) {
            (DocumentKind::EntryPoint, Some(plays)) => self.walk_plays(plays, scope)?,
            (DocumentKind::OperationList, Some(tasks)) => self.mutate(tasks, inherited, scope)?,
            _ => {
                tracing::debug!(path = %path.display(), "not a task list or playbook");
                false
            }
        };

        if dirty {
            self.store
                .save(path, &document)
                .map_err(|e| InjectError::persist(path, e))?;
            self.report.written += 1;
            tracing::info!(document = %location, "identity tags injected");
        }
        Ok(())
    }

    fn walk_plays(&mut self, plays: &mut [Value], scope: Scope<'_>) -> InjectResult<bool> {
        let mut dirty = false;

        for play in plays.iter_mut().filter_map(Value::as_mapping_mut) {
            if let Some(import) = model::playbook_import(play) {
                let target = import
                    .static_path()
                    .and_then(|token| self.resolver.resolve_include(token, scope.dir));
                if let Some(target) = target {
                    self.visit(&target, false)?;
                }
                continue;
            }

            let play_become = model::declared_become(play).unwrap_or(false);

            let roles: Vec<(String, bool)> = model::play_roles(play)
                .into_iter()
                .filter_map(|role| {
                    role.name
                        .map(|name| (name.to_string(), role.effective_become(play_become)))
                })
                .collect();
            for (name, elevated) in &roles {
                self.visit_role(name, *elevated, scope)?;
            }

            if model::has_method_override(play) {
                tracing::debug!(document = scope.location, "play sets become_method, sections left untouched");
                continue;
            }

            for section in keys::PLAY_SECTIONS {
                if let Some(tasks) = play.get_mut(section).and_then(Value::as_sequence_mut) {
                    dirty |= self.mutate(tasks, play_become, scope)?;
                }
            }
        }

        Ok(dirty)
    }

    fn visit_role(&mut self, name: &str, elevated: bool, scope: Scope<'_>) -> InjectResult<()> {
        let Some(role) = self.resolver.resolve_role(name, scope.dir) else {
            tracing::debug!(role = name, "role not found, ignored");
            return Ok(());
        };
        self.visit(&role.tasks(), elevated)?;
        self.visit(&role.handlers(), elevated)
    }
}

/// Walk every document under the configured root
///
/// Each discovered document is visited with no inherited elevation.
/// Entries the walk cannot read count as skipped.
///
/// # Errors
/// - `InjectError::RootNotFound` if the root does not exist
/// - `InjectError::Walk` if the root itself cannot be read
/// - `InjectError::Persist` if a mutated document cannot be written
pub fn inject(config: &InjectConfig) -> InjectResult<InjectReport> {
    let mut injector = Injector::new(config)?;
    let discovery = discover(config)?;
    injector.report.discovered = discovery.documents.len();
    injector.report.skipped += discovery.unreadable;

    for document in &discovery.documents {
        injector.visit(document, false)?;
    }

    let report = injector.into_report();
    tracing::info!("Injection finished: {report}");
    Ok(report)
}

/// Documents found under a root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Documents in file-name order
    pub documents: Vec<PathBuf>,
    /// Entries below the root that could not be read
    pub unreadable: usize,
}

/// Documents under the configured root, in file-name order
///
/// A root that is a file yields just that file. Unreadable entries below
/// the root are logged and left out.
///
/// # Errors
/// `InjectError::Walk` if the root directory itself cannot be read
pub fn discover(config: &InjectConfig) -> InjectResult<Discovery> {
    if config.root.is_file() {
        return Ok(Discovery {
            documents: vec![config.root.clone()],
            unreadable: 0,
        });
    }

    let mut discovery = Discovery::default();
    let walk = walkdir::WalkDir::new(&config.root)
        .follow_links(config.follow_links)
        .sort_by_file_name();

    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(InjectError::Walk {
                    path: config.root.clone(),
                    source,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                discovery.unreadable += 1;
                continue;
            }
        };
        if entry.file_type().is_file() && config.is_document(entry.path()) {
            tracing::debug!("Processing {}...", entry.path().display());
            discovery.documents.push(entry.into_path());
        }
    }
    Ok(discovery)
}
