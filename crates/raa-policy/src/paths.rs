//! Path-keyed policy entries

use std::collections::BTreeMap;
use std::path::Path;

/// Keep only entries whose path has no descendant among the other keys
///
/// `/etc` is dropped when `/etc/shadow` is present; paths are compared by
/// component, so `/etc` is not a parent of `/etcd`.
#[must_use]
pub fn keep_leaf_entries<V: Clone>(entries: &BTreeMap<String, V>) -> BTreeMap<String, V> {
    entries
        .iter()
        .filter(|(path, _)| {
            let path = Path::new(path.as_str());
            !entries
                .keys()
                .map(|other| Path::new(other.as_str()))
                .any(|other| other != path && other.starts_with(path))
        })
        .map(|(path, value)| (path.clone(), value.clone()))
        .collect()
}
