//! Become command lines
//!
//! The observe phase wraps each privileged command in `gensr generate` so
//! the capabilities it uses are recorded under the task's identity tag. The
//! enforce phase runs it through `sr`/`dosr`, which looks the tag up in the
//! generated policy.

use crate::context::TaskContext;
use crate::error::{BecomeError, BecomeResult};
use once_cell::sync::Lazy;
use regex::Regex;

static ANSIBLE_TMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/.*ansible-tmp-.*/").expect("static regex"));

/// Default `dosr` executable
pub const DOSR_EXE: &str = "/usr/bin/dosr";

/// Default `sr` executable
pub const SR_EXE: &str = "/usr/bin/sr";

/// Default policy file written by `gensr`
pub const DEFAULT_POLICY_OUTPUT: &str = "/tmp/capable_output.json";

/// Builds the command line a become method runs
pub trait BecomeCommand {
    /// Become method name as configured in Ansible
    fn name(&self) -> &str;

    /// Wrap `command` for the task in `ctx`
    ///
    /// An empty command stays empty.
    ///
    /// # Errors
    /// `BecomeError` if `command` cannot be split into arguments
    fn build(&self, command: &str, ctx: &TaskContext) -> BecomeResult<String>;
}

/// Observe-phase wrapper running the command under `gensr generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCommand {
    /// Privileged launcher of `gensr`
    pub launcher: String,
    /// Role and task the launcher runs `gensr` as
    pub launcher_role: String,
    /// Task of `launcher_role`
    pub launcher_task: String,
    /// `gensr` executable
    pub executable: String,
    /// Policy file `gensr` writes to
    pub output: String,
}

impl Default for GenerateCommand {
    fn default() -> Self {
        Self {
            launcher: DOSR_EXE.to_string(),
            launcher_role: "rar_ansible".to_string(),
            launcher_task: "generate_rar".to_string(),
            executable: "gensr".to_string(),
            output: DEFAULT_POLICY_OUTPUT.to_string(),
        }
    }
}

impl GenerateCommand {
    /// Write the policy to another file
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

impl BecomeCommand for GenerateCommand {
    fn name(&self) -> &str {
        "gensr"
    }

    fn build(&self, command: &str, ctx: &TaskContext) -> BecomeResult<String> {
        if command.is_empty() {
            return Ok(String::new());
        }

        let launcher = format!(
            "{} -r {} -t {}",
            self.launcher, self.launcher_role, self.launcher_task
        );
        let generate = format!(
            "{} generate {} -p \"{}\" -c \"{}\"",
            self.executable,
            ctx.become_flags,
            ctx.task_name.as_deref().unwrap_or_default(),
            self.output
        );
        Ok([launcher.as_str(), generate.as_str(), "--", command].join(" "))
    }
}

/// Enforce-phase wrapper running the command through `sr` or `dosr`
///
/// Ansible's temporary module directories are handed to the become user
/// before the command and given back after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstituteCommand {
    name: String,
    /// Executable the command runs through
    pub executable: String,
    /// Executable running the ownership changes
    pub chown_launcher: String,
    /// Role allowed to change ownership of Ansible's temporary files
    pub chown_role: String,
}

impl SubstituteCommand {
    /// `sr` become method
    #[must_use]
    pub fn sr() -> Self {
        Self {
            name: "sr".to_string(),
            executable: "sr".to_string(),
            chown_launcher: SR_EXE.to_string(),
            chown_role: "ansible".to_string(),
        }
    }

    /// `dosr` become method
    #[must_use]
    pub fn dosr() -> Self {
        Self {
            name: "dosr".to_string(),
            executable: "dosr".to_string(),
            chown_launcher: DOSR_EXE.to_string(),
            chown_role: "rar_ansible".to_string(),
        }
    }

    /// Use another executable
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }
}

impl BecomeCommand for SubstituteCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, command: &str, ctx: &TaskContext) -> BecomeResult<String> {
        if command.is_empty() {
            return Ok(String::new());
        }

        let flags = &ctx.become_flags;
        let exe = &self.executable;
        let mut prefix = String::new();
        let mut suffix = String::new();

        for arg in split_command(command)? {
            for tmp in ANSIBLE_TMP.find_iter(&arg) {
                let tmp = tmp.as_str();
                prefix.push_str(&format!(
                    "{} -r {} -t ansible_chown /usr/bin/chown -R \"`{exe} {flags} id -u`\":\"`{exe} {flags} id -u`\" \"{tmp}\"; ",
                    self.chown_launcher, self.chown_role
                ));
                suffix.push_str(&format!(
                    "; {} -r {} -t ansible_chown /usr/bin/chown -R \"`id -u`\":\"`id -u`\" \"{tmp}\" ",
                    self.chown_launcher, self.chown_role
                ));
            }
        }

        Ok([prefix.as_str(), exe, flags, command, suffix.as_str()].join(" "))
    }
}

/// Split a shell command into arguments, POSIX quoting rules
///
/// # Errors
/// `BecomeError::Unsplittable` for an unterminated quote or a trailing
/// backslash
pub fn split_command(command: &str) -> BecomeResult<Vec<String>> {
    shlex::split(command).ok_or_else(|| BecomeError::Unsplittable(command.to_string()))
}
