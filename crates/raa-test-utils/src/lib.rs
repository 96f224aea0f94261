//! Testing utilities for RootAsAnsible workspace
//!
//! Temporary Ansible trees and assertions on injected tags.

#![allow(missing_docs)]

use raa_document::{IdentityTag, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// Ansible tree in a temporary directory, removed on drop
pub struct Fixture {
    dir: TempDir,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn load(&self, rel: &str) -> Value {
        serde_yaml::from_str(&self.read(rel)).unwrap()
    }

    /// Contents of every file in the tree, keyed by relative path
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        walkdir::WalkDir::new(self.root())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(self.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                (rel, std::fs::read_to_string(entry.path()).unwrap())
            })
            .collect()
    }
}

/// `become_flags` of a task, if set
pub fn flags(task: &Value) -> Option<&str> {
    task.get("become_flags").and_then(Value::as_str)
}

/// Assert flags are exactly `-r <location> -t <uuid>`
pub fn assert_single_tag(flags: Option<&str>, location: &str) -> IdentityTag {
    let flags = flags.unwrap_or_else(|| panic!("no become_flags, expected tag for {location}"));
    let words: Vec<&str> = flags.split(' ').collect();
    assert_eq!(words.len(), 4, "unexpected flags: {flags:?}");
    assert_eq!(words[0], "-r", "unexpected flags: {flags:?}");
    assert_eq!(words[1], location, "unexpected flags: {flags:?}");
    assert_eq!(words[2], "-t", "unexpected flags: {flags:?}");
    assert!(
        Uuid::parse_str(words[3]).is_ok(),
        "instance id is not a uuid: {flags:?}"
    );
    IdentityTag::new(words[1], words[3])
}

/// Number of `-r` occurrences, i.e. tags, in a flags string
pub fn tag_count(flags: Option<&str>) -> usize {
    flags.map_or(0, |f| f.split_whitespace().filter(|w| *w == "-r").count())
}
