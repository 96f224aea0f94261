//! `ansible-playbook` invocations

use crate::settings::Settings;
use anyhow::{bail, Context};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// One `ansible-playbook` run from the build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookRun {
    program: String,
    playbook: PathBuf,
    inventory: PathBuf,
    extra_vars: String,
    become_method: Option<String>,
    ask_become_pass: bool,
    ansible_timeout_secs: u64,
}

impl PlaybookRun {
    /// Run `playbook` with the inventory and variables of `settings`
    #[must_use]
    pub fn new(settings: &Settings, playbook: impl Into<PathBuf>) -> Self {
        Self {
            program: settings.ansible_playbook.clone(),
            playbook: playbook.into(),
            inventory: settings.inventory.clone(),
            extra_vars: settings.extra_vars.clone(),
            become_method: None,
            ask_become_pass: false,
            ansible_timeout_secs: settings.ansible_timeout_secs,
        }
    }

    /// Force a become method
    #[must_use]
    pub fn with_become_method(mut self, method: impl Into<String>) -> Self {
        self.become_method = Some(method.into());
        self
    }

    /// Prompt for the become password (`-K`)
    #[must_use]
    pub fn ask_become_pass(mut self) -> Self {
        self.ask_become_pass = true;
        self
    }

    /// Command line arguments after the program name
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.playbook.clone().into(),
            "-i".into(),
            self.inventory.clone().into(),
            "-e".into(),
            self.extra_vars.clone().into(),
        ];
        if let Some(method) = &self.become_method {
            args.push("--become-method".into());
            args.push(method.into());
        }
        if self.ask_become_pass {
            args.push("-K".into());
        }
        args
    }

    /// Environment exported to the run
    #[must_use]
    pub fn envs(&self) -> Vec<(&'static str, String)> {
        let mut envs = vec![("ANSIBLE_TIMEOUT", self.ansible_timeout_secs.to_string())];
        if let Some(method) = &self.become_method {
            envs.push(("ANSIBLE_BECOME_METHOD", method.clone()));
        }
        envs
    }

    /// Run in `cwd`, inheriting the terminal
    ///
    /// # Errors
    /// If the program cannot be started, exits unsuccessfully or outlives
    /// `timeout`
    pub async fn run(&self, cwd: &Path, timeout: Option<Duration>) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .envs(self.envs())
            .env("PWD", cwd)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        tracing::info!(
            playbook = %self.playbook.display(),
            become_method = self.become_method.as_deref().unwrap_or("default"),
            "running playbook"
        );

        let mut child = cmd
            .spawn()
            .with_context(|| format!("starting {}", self.program))?;

        let waited = match timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                let Ok(waited) = waited else {
                    child.kill().await.ok();
                    bail!(
                        "{} timed out after {}s",
                        self.playbook.display(),
                        limit.as_secs()
                    );
                };
                waited
            }
            None => child.wait().await,
        };
        let status = waited.with_context(|| format!("waiting for {}", self.program))?;

        if !status.success() {
            tracing::error!(playbook = %self.playbook.display(), %status, "playbook failed");
            bail!("{} failed: {status}", self.playbook.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(run: &PlaybookRun) -> Vec<String> {
        run.args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn observe_run_asks_for_password() {
        let settings = Settings::default();
        let run = PlaybookRun::new(&settings, &settings.playbook)
            .with_become_method("capable")
            .ask_become_pass();

        assert_eq!(
            args(&run),
            [
                "playbooks/main.yml",
                "-i",
                "inventory/hosts.yml",
                "-e",
                "@vars/vars.yml",
                "--become-method",
                "capable",
                "-K"
            ]
        );
        assert_eq!(
            run.envs(),
            [
                ("ANSIBLE_TIMEOUT", "120".to_string()),
                ("ANSIBLE_BECOME_METHOD", "capable".to_string())
            ]
        );
    }

    #[test]
    fn plain_run_keeps_configured_method() {
        let settings = Settings::default();
        let run = PlaybookRun::new(&settings, &settings.enforce_playbook);

        assert_eq!(
            args(&run),
            [
                "playbooks/enforce_rar_policy.yml",
                "-i",
                "inventory/hosts.yml",
                "-e",
                "@vars/vars.yml"
            ]
        );
        assert_eq!(run.envs().len(), 1);
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let settings = Settings {
            ansible_playbook: "raa-no-such-ansible-playbook".to_string(),
            ..Settings::default()
        };
        let dir = tempfile::tempdir().unwrap();

        let err = PlaybookRun::new(&settings, "site.yml")
            .run(dir.path(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("starting"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_is_checked() {
        let dir = tempfile::tempdir().unwrap();

        let ok = Settings {
            ansible_playbook: "true".to_string(),
            ..Settings::default()
        };
        PlaybookRun::new(&ok, "site.yml").run(dir.path(), None).await.unwrap();

        let failing = Settings {
            ansible_playbook: "false".to_string(),
            ..Settings::default()
        };
        assert!(PlaybookRun::new(&failing, "site.yml")
            .run(dir.path(), None)
            .await
            .is_err());
    }
}
