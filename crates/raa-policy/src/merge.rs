//! Policy merge
//!
//! The generated policy names its roles and tasks after the identity tags
//! observed at runtime; the reviewed scenario policy describes the same
//! roles and tasks by `purpose`. Merging copies generated names onto the
//! scenario entries with the same purpose and appends the scenario roles to
//! the base policy.

use crate::error::{PolicyError, PolicyResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

const ROLES: &str = "roles";
const TASKS: &str = "tasks";
const PURPOSE: &str = "purpose";
const NAME: &str = "name";

/// Outcome of a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Scenario roles renamed after a generated role
    pub roles_matched: usize,
    /// Scenario tasks renamed after a generated task
    pub tasks_matched: usize,
    /// Roles appended to the base policy
    pub roles_appended: usize,
}

impl Display for MergeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roles appended, {} roles and {} tasks renamed",
            self.roles_appended, self.roles_matched, self.tasks_matched
        )
    }
}

/// Files taking part in a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyPaths {
    /// Policy the scenario roles are appended to
    pub base: PathBuf,
    /// Reviewed roles, matched by purpose
    pub scenario: PathBuf,
    /// Policy produced by the observe phase
    pub generated: PathBuf,
    /// Merged policy destination
    pub output: PathBuf,
}

/// Merge `scenario` into `base`, renaming after `generated`
///
/// # Errors
/// `PolicyError::Shape` if a policy lacks a `roles` array
pub fn merge_policies(
    base: &mut Value,
    mut scenario: Value,
    generated: &Value,
) -> PolicyResult<MergeSummary> {
    let mut summary = MergeSummary::default();

    let generated_roles = by_purpose(roles(generated, "generated")?);

    let scenario_roles = roles_mut(&mut scenario, "scenario")?;
    for role in scenario_roles.iter_mut().filter_map(Value::as_object_mut) {
        let Some(generated_role) = purpose(role).and_then(|p| generated_roles.get(p)) else {
            continue;
        };
        if let Some(name) = generated_role.get(NAME) {
            role.insert(NAME.to_string(), name.clone());
        }
        summary.roles_matched += 1;

        let generated_tasks = generated_role
            .get(TASKS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .map(by_purpose)
            .unwrap_or_default();

        let Some(tasks) = role.get_mut(TASKS).and_then(Value::as_array_mut) else {
            continue;
        };
        for task in tasks.iter_mut().filter_map(Value::as_object_mut) {
            let name = purpose(task)
                .and_then(|p| generated_tasks.get(p))
                .and_then(|t| t.get(NAME))
                .cloned();
            if let Some(name) = name {
                task.insert(NAME.to_string(), name);
                summary.tasks_matched += 1;
            }
        }
    }

    let appended = std::mem::take(scenario_roles);
    summary.roles_appended = appended.len();
    roles_mut(base, "base")?.extend(appended);

    Ok(summary)
}

/// Merge policy files and write the result with 4-space indentation
///
/// # Errors
/// - `PolicyError::Io` if a file cannot be read or written
/// - `PolicyError::Json` if a file is not JSON
/// - `PolicyError::Shape` if a policy lacks a `roles` array
pub fn merge_policy_files(paths: &PolicyPaths) -> PolicyResult<MergeSummary> {
    let mut base = read_json(&paths.base)?;
    let scenario = read_json(&paths.scenario)?;
    let generated = read_json(&paths.generated)?;

    let summary = merge_policies(&mut base, scenario, &generated)?;
    write_json(&paths.output, &base)?;

    tracing::info!(
        output = %paths.output.display(),
        roles = summary.roles_appended,
        matched = summary.roles_matched,
        "policy merged"
    );
    Ok(summary)
}

fn roles<'a>(policy: &'a Value, which: &'static str) -> PolicyResult<&'a Vec<Value>> {
    policy
        .get(ROLES)
        .and_then(Value::as_array)
        .ok_or(PolicyError::Shape(which))
}

fn roles_mut<'a>(policy: &'a mut Value, which: &'static str) -> PolicyResult<&'a mut Vec<Value>> {
    policy
        .get_mut(ROLES)
        .and_then(Value::as_array_mut)
        .ok_or(PolicyError::Shape(which))
}

fn purpose(entry: &Map<String, Value>) -> Option<&str> {
    entry.get(PURPOSE).and_then(Value::as_str)
}

/// Index entries by purpose; later entries win, like a dict comprehension
fn by_purpose(entries: &[Value]) -> HashMap<&str, &Map<String, Value>> {
    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| purpose(entry).map(|p| (p, entry)))
        .collect()
}

fn read_json(path: &Path) -> PolicyResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| PolicyError::io_error(path, e))?;
    serde_json::from_str(&content).map_err(|source| PolicyError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json(path: &Path, value: &Value) -> PolicyResult<()> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| PolicyError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, out).map_err(|e| PolicyError::io_error(path, e))
}
