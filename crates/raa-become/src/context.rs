//! Typed context of the task being executed
//!
//! Carries what a become command needs to know about the current task from
//! the playbook run down to the command builder.

use once_cell::sync::Lazy;
use raa_document::IdentityTag;
use regex::Regex;

static TASK_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[id:([a-f0-9\-]+)\]").expect("static regex"));

/// Task about to run under a become method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskContext {
    /// Task name as shown by Ansible
    pub task_name: Option<String>,
    /// `become_flags` resolved for the task
    pub become_flags: String,
    /// Identity tag found in the flags
    pub identity: Option<IdentityTag>,
}

impl TaskContext {
    /// Create context from a task name and its resolved flags
    #[must_use]
    pub fn new(task_name: Option<String>, become_flags: impl Into<String>) -> Self {
        let become_flags = become_flags.into();
        let identity = IdentityTag::parse(&become_flags);
        Self {
            task_name,
            become_flags,
            identity,
        }
    }

    /// Instance id embedded in a task name as `[id:<uuid>]`
    #[must_use]
    pub fn instance_from_task_name(task_name: &str) -> Option<&str> {
        TASK_ID
            .captures(task_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Instance id of the current task, from the tag or the task name
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(IdentityTag::instance)
            .or_else(|| self.task_name.as_deref().and_then(Self::instance_from_task_name))
    }
}
