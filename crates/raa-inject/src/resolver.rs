//! Reference resolution
//!
//! Turns include tokens and role names into candidate paths. Existence of
//! include targets is not checked here: a missing target is simply not part
//! of the graph and the traversal drops it on visit.

use raa_document::model::is_templated;
use std::path::{Component, Path, PathBuf};

/// Directory holding roles, next to a playbook or at the root
pub const ROLES_DIR: &str = "roles";

const MAIN_FILES: [&str; 2] = ["main.yml", "main.yaml"];

/// A role directory found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDir {
    path: PathBuf,
}

impl RoleDir {
    /// Role directory
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Main task list of the role (`tasks/main.yml`)
    #[must_use]
    pub fn tasks(&self) -> PathBuf {
        self.main_file("tasks")
    }

    /// Handler list of the role (`handlers/main.yml`)
    #[must_use]
    pub fn handlers(&self) -> PathBuf {
        self.main_file("handlers")
    }

    fn main_file(&self, section: &str) -> PathBuf {
        let dir = self.path.join(section);
        MAIN_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| dir.join(MAIN_FILES[0]))
    }
}

/// Resolves references against a traversal root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    /// Create resolver for a root directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Traversal root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an include or playbook import relative to the including file
    ///
    /// Returns `None` for templated tokens.
    #[must_use]
    pub fn resolve_include(&self, token: &str, current_dir: &Path) -> Option<PathBuf> {
        if is_templated(token) {
            return None;
        }
        Some(current_dir.join(token))
    }

    /// Find a role next to the current document, then under the root
    #[must_use]
    pub fn resolve_role(&self, name: &str, current_dir: &Path) -> Option<RoleDir> {
        if is_templated(name) {
            return None;
        }
        [current_dir, self.root.as_path()]
            .into_iter()
            .map(|base| base.join(ROLES_DIR).join(name))
            .find(|candidate| candidate.is_dir())
            .map(|path| RoleDir { path })
    }

    /// Location identifier of a document: its path relative to the root
    ///
    /// Always `/`-separated; starts with `..` for documents outside the root.
    #[must_use]
    pub fn location_of(&self, path: &Path) -> String {
        relative_path(path, &self.root)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<Component<'_>> = path.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component);
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_joins_current_dir() {
        let resolver = Resolver::new("/work");
        assert_eq!(
            resolver.resolve_include("setup.yml", Path::new("/work/roles/web/tasks")),
            Some(PathBuf::from("/work/roles/web/tasks/setup.yml"))
        );
    }

    #[test]
    fn templated_include_is_refused() {
        let resolver = Resolver::new("/work");
        assert_eq!(
            resolver.resolve_include("{{ ansible_os_family }}.yml", Path::new("/work")),
            None
        );
    }

    #[test]
    fn role_prefers_local_roles_dir() {
        let root = tempfile::tempdir().unwrap();
        let playbooks = root.path().join("playbooks");
        std::fs::create_dir_all(playbooks.join("roles/web")).unwrap();
        std::fs::create_dir_all(root.path().join("roles/web")).unwrap();
        std::fs::create_dir_all(root.path().join("roles/db")).unwrap();

        let resolver = Resolver::new(root.path());
        let web = resolver.resolve_role("web", &playbooks).unwrap();
        assert_eq!(web.path(), playbooks.join("roles/web"));

        let db = resolver.resolve_role("db", &playbooks).unwrap();
        assert_eq!(db.path(), root.path().join("roles/db"));

        assert_eq!(resolver.resolve_role("missing", &playbooks), None);
        assert_eq!(resolver.resolve_role("{{ role }}", &playbooks), None);
    }

    #[test]
    fn role_main_files() {
        let root = tempfile::tempdir().unwrap();
        let role = root.path().join("roles/web");
        std::fs::create_dir_all(role.join("tasks")).unwrap();
        std::fs::create_dir_all(role.join("handlers")).unwrap();
        std::fs::write(role.join("handlers/main.yaml"), "[]\n").unwrap();

        let dir = Resolver::new(root.path())
            .resolve_role("web", root.path())
            .unwrap();
        assert_eq!(dir.tasks(), role.join("tasks/main.yml"));
        assert_eq!(dir.handlers(), role.join("handlers/main.yaml"));
    }

    #[test]
    fn location_is_relative_to_root() {
        let resolver = Resolver::new("/work/build");
        assert_eq!(
            resolver.location_of(Path::new("/work/build/roles/web/tasks/main.yml")),
            "roles/web/tasks/main.yml"
        );
        assert_eq!(
            resolver.location_of(Path::new("/work/shared/tasks.yml")),
            "../shared/tasks.yml"
        );
    }
}
