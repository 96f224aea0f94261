//! Typed views over Ansible documents
//!
//! Documents stay as `serde_yaml::Value` trees so unknown keys and key order
//! survive a rewrite. This module classifies a document once and gives the
//! traversal named accessors for the keys it cares about.

use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

/// Marker of an unexpanded Jinja expression
pub const TEMPLATE_MARKER: &str = "{{";

/// Keys read or written by the traversal
pub mod keys {
    /// Play-level host pattern, only present on plays
    pub const HOSTS: &str = "hosts";
    /// Elevation flag
    pub const BECOME: &str = "become";
    /// Elevation method override
    pub const BECOME_METHOD: &str = "become_method";
    /// Free-form flags passed to the become method
    pub const BECOME_FLAGS: &str = "become_flags";
    /// Role list of a play
    pub const ROLES: &str = "roles";
    /// Role name inside a role mapping
    pub const ROLE: &str = "role";
    /// Alternate role name key
    pub const NAME: &str = "name";
    /// File of an include given as mapping
    pub const FILE: &str = "file";
    /// Primary list of a block
    pub const BLOCK: &str = "block";
    /// Failure handler list of a block
    pub const RESCUE: &str = "rescue";
    /// Always-run list of a block
    pub const ALWAYS: &str = "always";

    /// Keys importing another playbook
    pub const IMPORT_PLAYBOOK: [&str; 2] = ["import_playbook", "ansible.builtin.import_playbook"];

    /// Keys including a task file, checked in order
    pub const INCLUDE: [&str; 6] = [
        "include",
        "include_tasks",
        "import_tasks",
        "ansible.builtin.include",
        "ansible.builtin.include_tasks",
        "ansible.builtin.import_tasks",
    ];

    /// Task sections of a play, in execution order
    pub const PLAY_SECTIONS: [&str; 4] = ["pre_tasks", "tasks", "post_tasks", "handlers"];

    /// Nested task lists of a block, in execution order
    pub const BLOCK_SECTIONS: [&str; 3] = [BLOCK, RESCUE, ALWAYS];
}

/// Structural kind of a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Sequence of plays or playbook imports
    EntryPoint,
    /// Sequence of tasks
    OperationList,
    /// Anything that is not a sequence
    Unrecognized,
}

impl DocumentKind {
    /// Classify a document by inspecting its top-level entries
    #[must_use]
    pub fn classify(document: &Value) -> Self {
        let Some(entries) = document.as_sequence() else {
            return Self::Unrecognized;
        };

        let is_entry_point = entries
            .iter()
            .filter_map(Value::as_mapping)
            .any(|entry| entry.contains_key(keys::HOSTS) || playbook_import(entry).is_some());

        if is_entry_point {
            Self::EntryPoint
        } else {
            Self::OperationList
        }
    }
}

/// A reference from one document to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// Path token, possibly still templated
    File(&'a str),
    /// Value the traversal cannot interpret as a path
    Unresolvable,
}

impl<'a> Reference<'a> {
    fn from_value(value: &'a Value) -> Self {
        let path = match value {
            Value::Mapping(map) => map.get(keys::FILE),
            other => Some(other),
        };
        path.and_then(Value::as_str)
            .map_or(Self::Unresolvable, Self::File)
    }

    /// Path token if it can be followed statically
    #[must_use]
    pub fn static_path(self) -> Option<&'a str> {
        match self {
            Self::File(token) if !is_templated(token) => Some(token),
            _ => None,
        }
    }
}

/// Whether a token still contains a template expression
#[inline]
#[must_use]
pub fn is_templated(token: &str) -> bool {
    token.contains(TEMPLATE_MARKER)
}

/// Playbook import carried by a play entry, if any
#[must_use]
pub fn playbook_import(entry: &Mapping) -> Option<Reference<'_>> {
    keys::IMPORT_PLAYBOOK
        .iter()
        .find_map(|key| entry.get(*key))
        .map(Reference::from_value)
}

/// Task-file include carried by a task, if any
///
/// The first include key present wins, even when its value is unusable.
#[must_use]
pub fn task_include(task: &Mapping) -> Option<Reference<'_>> {
    keys::INCLUDE
        .iter()
        .find_map(|key| task.get(*key))
        .map(Reference::from_value)
}

/// Ansible-style truthiness of a keyword value
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "yes" | "true"),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

/// Declared elevation of a play, role or task; `None` when not declared
#[inline]
#[must_use]
pub fn declared_become(node: &Mapping) -> Option<bool> {
    node.get(keys::BECOME).map(truthy)
}

/// Whether a value is set to something: non-empty, non-zero, not null
#[must_use]
pub fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_set(&tagged.value),
    }
}

/// Whether the node picks its own become method
#[inline]
#[must_use]
pub fn has_method_override(node: &Mapping) -> bool {
    node.get(keys::BECOME_METHOD).is_some_and(is_set)
}

/// Current `become_flags` rendered as text
///
/// Absent or null flags read as empty. Numbers and booleans are rendered.
/// Returns `None` for collections, which cannot carry a tag.
#[must_use]
pub fn become_flags(task: &Mapping) -> Option<Cow<'_, str>> {
    match task.get(keys::BECOME_FLAGS) {
        None | Some(Value::Null) => Some(Cow::Borrowed("")),
        Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
        Some(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
        Some(Value::Bool(b)) => Some(Cow::Owned(b.to_string())),
        Some(Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_)) => None,
    }
}

/// Replace `become_flags`, keeping its position when already present
pub fn set_become_flags(task: &mut Mapping, flags: String) {
    match task.get_mut(keys::BECOME_FLAGS) {
        Some(slot) => *slot = Value::String(flags),
        None => {
            task.insert(Value::String(keys::BECOME_FLAGS.to_string()), Value::String(flags));
        }
    }
}

/// Entry of a play's `roles` list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRef<'a> {
    /// Role name, `None` when the entry names no role
    pub name: Option<&'a str>,
    /// Role-level elevation override
    pub elevated: Option<bool>,
}

impl<'a> RoleRef<'a> {
    /// Read a role entry: a bare name or a mapping with `role` (or `name`)
    #[must_use]
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self {
                name: Some(name.as_str()),
                elevated: None,
            }),
            Value::Mapping(map) => Some(Self {
                name: map
                    .get(keys::ROLE)
                    .or_else(|| map.get(keys::NAME))
                    .and_then(Value::as_str),
                elevated: declared_become(map),
            }),
            _ => None,
        }
    }

    /// Elevation the role runs with under a play
    #[inline]
    #[must_use]
    pub fn effective_become(&self, play_become: bool) -> bool {
        self.elevated.unwrap_or(play_become)
    }
}

/// Role entries of a play
#[must_use]
pub fn play_roles(play: &Mapping) -> Vec<RoleRef<'_>> {
    play.get(keys::ROLES)
        .and_then(Value::as_sequence)
        .map(|roles| roles.iter().filter_map(RoleRef::from_value).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    fn mapping(src: &str) -> Mapping {
        yaml(src).as_mapping().cloned().unwrap()
    }

    #[test]
    fn classify_playbook_by_hosts() {
        let doc = yaml("- hosts: all\n  tasks: []\n");
        assert_eq!(DocumentKind::classify(&doc), DocumentKind::EntryPoint);
    }

    #[test]
    fn classify_playbook_by_import() {
        let doc = yaml("- ansible.builtin.import_playbook: other.yml\n");
        assert_eq!(DocumentKind::classify(&doc), DocumentKind::EntryPoint);
    }

    #[test]
    fn classify_task_list() {
        let doc = yaml("- name: t\n  command: id\n");
        assert_eq!(DocumentKind::classify(&doc), DocumentKind::OperationList);
    }

    #[test]
    fn classify_non_sequence() {
        assert_eq!(DocumentKind::classify(&Value::Null), DocumentKind::Unrecognized);
        assert_eq!(
            DocumentKind::classify(&yaml("all:\n  hosts: {}\n")),
            DocumentKind::Unrecognized
        );
    }

    #[test]
    fn truthiness_follows_ansible_strings() {
        assert!(truthy(&yaml("yes")));
        assert!(truthy(&yaml("'True'")));
        assert!(!truthy(&yaml("'no'")));
        assert!(!truthy(&yaml("'on'")));
        assert!(truthy(&yaml("1")));
        assert!(!truthy(&yaml("0")));
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&yaml("[]")));
    }

    #[test]
    fn include_as_string_or_mapping() {
        let task = mapping("include_tasks: setup.yml\n");
        assert_eq!(task_include(&task), Some(Reference::File("setup.yml")));

        let task = mapping("ansible.builtin.import_tasks:\n  file: db.yml\n");
        assert_eq!(task_include(&task), Some(Reference::File("db.yml")));

        let task = mapping("include_tasks:\n  apply: {}\n");
        assert_eq!(task_include(&task), Some(Reference::Unresolvable));

        assert_eq!(task_include(&mapping("command: id\n")), None);
    }

    #[test]
    fn templated_reference_has_no_static_path() {
        assert_eq!(Reference::File("{{ os }}.yml").static_path(), None);
        assert_eq!(Reference::File("debian.yml").static_path(), Some("debian.yml"));
        assert_eq!(Reference::Unresolvable.static_path(), None);
    }

    #[test]
    fn role_entries() {
        let play = mapping("roles:\n- common\n- role: web\n  become: false\n- name: db\n- 42\n");
        let roles = play_roles(&play);
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0], RoleRef { name: Some("common"), elevated: None });
        assert_eq!(roles[1].name, Some("web"));
        assert!(!roles[1].effective_become(true));
        assert!(roles[2].effective_become(true));
        assert_eq!(roles[2].name, Some("db"));
    }

    #[test]
    fn method_override_requires_a_set_value() {
        assert!(has_method_override(&mapping("become_method: su\n")));
        assert!(!has_method_override(&mapping("become_method: ''\n")));
        assert!(!has_method_override(&mapping("become: true\n")));
    }

    #[test]
    fn set_flags_keeps_position() {
        let mut task = mapping("name: t\nbecome_flags: -E\ncommand: id\n");
        set_become_flags(&mut task, "-E -r x -t y".to_string());
        let keys: Vec<_> = task.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["name", "become_flags", "command"]);
        assert_eq!(become_flags(&task).as_deref(), Some("-E -r x -t y"));
    }

    #[test]
    fn scalar_flags_are_rendered() {
        assert_eq!(become_flags(&mapping("name: t\n")).as_deref(), Some(""));
        assert_eq!(become_flags(&mapping("become_flags: ~\n")).as_deref(), Some(""));
        assert_eq!(become_flags(&mapping("become_flags: 5\n")).as_deref(), Some("5"));
        assert_eq!(become_flags(&mapping("become_flags: true\n")).as_deref(), Some("true"));
        assert_eq!(become_flags(&mapping("become_flags: [-E]\n")), None);
        assert_eq!(become_flags(&mapping("become_flags: {a: 1}\n")), None);
    }

    proptest! {
        #[test]
        fn booleans_are_their_own_truth(b in any::<bool>()) {
            prop_assert_eq!(truthy(&Value::Bool(b)), b);
            let rendered = Value::String(if b { "YES".into() } else { "No".into() });
            prop_assert_eq!(truthy(&rendered), b);
        }
    }
}
