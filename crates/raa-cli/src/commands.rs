//! Subcommand implementations

use crate::playbook::PlaybookRun;
use crate::settings::Settings;
use crate::tree::prepare_build_dir;
use anyhow::{anyhow, Context};
use raa_become::{BecomeCommand, GenerateCommand, SubstituteCommand, TaskContext};
use raa_document::model::{self, keys};
use raa_document::{DocumentStore, Mapping, Value};
use raa_inject::{InjectConfig, InjectReport};
use raa_policy::{merge_policy_files, MergeSummary, PolicyPaths};
use std::path::Path;

/// Become method observing privileges during the discover run
pub const OBSERVE_METHOD: &str = "capable";

/// Become method enforcing the merged policy
pub const ENFORCE_METHOD: &str = "dosr";

/// Tag every elevated task under `root`
///
/// # Errors
/// If the root is missing or a tagged document cannot be written back
pub fn inject(root: &Path) -> anyhow::Result<InjectReport> {
    raa_inject::inject(&InjectConfig::new(root))
        .with_context(|| format!("injecting identity tags under {}", root.display()))
}

/// Merge the scenario policy into the base policy
///
/// # Errors
/// If a policy cannot be read, parsed or written
pub fn merge_policy(paths: &PolicyPaths) -> anyhow::Result<MergeSummary> {
    merge_policy_files(paths)
        .with_context(|| format!("merging policies into {}", paths.output.display()))
}

/// Copy the scenario, tag it, then observe it under `capable`
///
/// # Errors
/// If the build dir cannot be prepared, injection fails or the playbook
/// run fails
pub async fn discover(settings: &Settings) -> anyhow::Result<InjectReport> {
    prepare_build_dir(&settings.scenario_dir, &settings.build_dir)?;

    let report = inject(&settings.build_dir)?;
    tracing::info!(%report, "build dir tagged");

    PlaybookRun::new(settings, &settings.playbook)
        .with_become_method(OBSERVE_METHOD)
        .ask_become_pass()
        .run(&settings.build_dir, settings.run_timeout())
        .await?;

    tracing::info!(
        policy = %settings.policy_paths().generated.display(),
        "policy generated"
    );
    Ok(report)
}

/// Merge policies, push the result, then replay the scenario under `dosr`
///
/// # Errors
/// If the merge fails or either playbook run fails
pub async fn enforce(settings: &Settings) -> anyhow::Result<MergeSummary> {
    let summary = merge_policy(&settings.policy_paths())?;

    PlaybookRun::new(settings, &settings.enforce_playbook)
        .run(&settings.build_dir, settings.run_timeout())
        .await?;

    PlaybookRun::new(settings, &settings.scenario_playbook)
        .with_become_method(ENFORCE_METHOD)
        .run(&settings.build_dir, settings.run_timeout())
        .await?;

    tracing::info!("scenario replayed under enforced policy");
    Ok(summary)
}

/// Become method a command line is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BecomeMethod {
    /// Observe under `gensr generate`
    Gensr,
    /// Enforce through `sr`
    Sr,
    /// Enforce through `dosr`
    Dosr,
}

impl BecomeMethod {
    fn builder(self) -> Box<dyn BecomeCommand> {
        match self {
            Self::Gensr => Box::new(GenerateCommand::default()),
            Self::Sr => Box::new(SubstituteCommand::sr()),
            Self::Dosr => Box::new(SubstituteCommand::dosr()),
        }
    }
}

/// Render the command line `method` runs for the tagged task `task` of
/// `document`
///
/// # Errors
/// If the document cannot be loaded, holds no task of that name with
/// scalar `become_flags`, or `command` cannot be split
pub fn wrap(
    document: &Path,
    task: &str,
    method: BecomeMethod,
    command: &str,
) -> anyhow::Result<String> {
    let loaded = DocumentStore::new()
        .load(document)
        .with_context(|| format!("loading {}", document.display()))?;

    let flags = find_task(&loaded, task)
        .and_then(model::become_flags)
        .ok_or_else(|| {
            anyhow!(
                "no task named {task:?} with become_flags in {}",
                document.display()
            )
        })?;

    let ctx = TaskContext::new(Some(task.to_string()), flags.into_owned());
    if ctx.identity.is_none() {
        tracing::warn!(task, "task carries no identity tag");
    }

    let builder = method.builder();
    tracing::debug!(method = builder.name(), task, "rendering become command");
    builder
        .build(command, &ctx)
        .with_context(|| format!("wrapping command for {task:?}"))
}

/// First mapping named `name` that carries `become_flags`, depth first
fn find_task<'a>(node: &'a Value, name: &str) -> Option<&'a Mapping> {
    match node {
        Value::Sequence(items) => items.iter().find_map(|item| find_task(item, name)),
        Value::Mapping(map) => {
            let named = map.get(keys::NAME).and_then(Value::as_str) == Some(name);
            if named && map.contains_key(keys::BECOME_FLAGS) {
                return Some(map);
            }
            map.values().find_map(|value| find_task(value, name))
        }
        _ => None,
    }
}
