//! Driver settings
//!
//! Every field has a default matching the layout of a RootAsAnsible
//! scenario, so a settings file only lists what differs.

use anyhow::Context;
use raa_policy::PolicyPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "raa.toml";

/// Layout of the scenario and how playbooks are run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Pristine scenario tree
    pub scenario_dir: PathBuf,
    /// Working copy the scenario is injected and run from
    pub build_dir: PathBuf,
    /// Observe-phase playbook, relative to the build dir
    pub playbook: PathBuf,
    /// Playbook replayed under enforcement, relative to the build dir
    pub scenario_playbook: PathBuf,
    /// Playbook pushing the merged policy, relative to the build dir
    pub enforce_playbook: PathBuf,
    /// Inventory, relative to the build dir
    pub inventory: PathBuf,
    /// Value of `-e`
    pub extra_vars: String,
    /// Directory holding policies, relative to the build dir
    pub templates_dir: PathBuf,
    /// Policy file names inside the templates dir
    pub policies: PolicyFiles,
    /// `ansible-playbook` executable
    pub ansible_playbook: String,
    /// Exported as `ANSIBLE_TIMEOUT`
    pub ansible_timeout_secs: u64,
    /// Kill a playbook run after this many seconds
    pub run_timeout_secs: Option<u64>,
}

/// Policy file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyFiles {
    /// Policy the scenario roles are appended to
    pub base: String,
    /// Reviewed scenario roles
    pub scenario: String,
    /// Written by the observe phase
    pub generated: String,
    /// Merged result pushed to the host
    pub merged: String,
}

impl Default for PolicyFiles {
    fn default() -> Self {
        Self {
            base: "sr_rootasrole.json".to_string(),
            scenario: "sr_scenario.json".to_string(),
            generated: "result.json".to_string(),
            merged: "result_sr_rootasrole.json".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenario_dir: PathBuf::from("scenario"),
            build_dir: PathBuf::from("build"),
            playbook: PathBuf::from("playbooks/main.yml"),
            scenario_playbook: PathBuf::from("playbooks/scenario.yml"),
            enforce_playbook: PathBuf::from("playbooks/enforce_rar_policy.yml"),
            inventory: PathBuf::from("inventory/hosts.yml"),
            extra_vars: "@vars/vars.yml".to_string(),
            templates_dir: PathBuf::from("templates"),
            policies: PolicyFiles::default(),
            ansible_playbook: "ansible-playbook".to_string(),
            ansible_timeout_secs: 120,
            run_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings
    ///
    /// An explicit path must exist. Without one, `raa.toml` in the working
    /// directory is used when present, defaults otherwise.
    ///
    /// # Errors
    /// If the file cannot be read or is not valid settings TOML
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = Self::from_toml(&contents)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    /// If the text is not valid settings TOML
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Templates directory inside the build dir
    #[must_use]
    pub fn templates(&self) -> PathBuf {
        self.build_dir.join(&self.templates_dir)
    }

    /// Policy files of the merge step
    #[must_use]
    pub fn policy_paths(&self) -> PolicyPaths {
        let templates = self.templates();
        PolicyPaths {
            base: templates.join(&self.policies.base),
            scenario: templates.join(&self.policies.scenario),
            generated: templates.join(&self.policies.generated),
            output: templates.join(&self.policies.merged),
        }
    }

    /// Playbook run timeout
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_listed_fields() {
        let settings = Settings::from_toml(
            r#"
build_dir = "/tmp/raa-build"
run_timeout_secs = 600

[policies]
generated = "capable.json"
"#,
        )
        .unwrap();

        assert_eq!(settings.build_dir, PathBuf::from("/tmp/raa-build"));
        assert_eq!(settings.run_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(settings.policies.generated, "capable.json");
        assert_eq!(settings.policies.base, "sr_rootasrole.json");
        assert_eq!(settings.playbook, PathBuf::from("playbooks/main.yml"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_toml("build = \"x\"").is_err());
    }

    #[test]
    fn policy_paths_live_in_build_templates() {
        let paths = Settings::default().policy_paths();
        assert_eq!(paths.base, PathBuf::from("build/templates/sr_rootasrole.json"));
        assert_eq!(paths.scenario, PathBuf::from("build/templates/sr_scenario.json"));
        assert_eq!(paths.generated, PathBuf::from("build/templates/result.json"));
        assert_eq!(paths.output, PathBuf::from("build/templates/result_sr_rootasrole.json"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("raa.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raa.toml");
        std::fs::write(&path, "ansible_timeout_secs = 30\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.ansible_timeout_secs, 30);
    }
}
