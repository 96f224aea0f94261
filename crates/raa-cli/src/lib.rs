//! RootAsAnsible driver
//!
//! Runs the observe/enforce loop over a scenario tree:
//! - `inject` tags every elevated task of a tree in place
//! - `discover` copies the scenario to the build dir, tags it and runs it
//!   under `capable` so `gensr` records a policy per tag
//! - `merge-policy` folds the generated names into the reviewed policy
//! - `enforce` merges, pushes the policy and replays the scenario under `dosr`
//! - `wrap` prints the command line a become method runs for a tagged task

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use clap::{Parser, Subcommand};
use raa_policy::PolicyPaths;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod commands;
pub mod playbook;
pub mod settings;
pub mod tree;

pub use settings::Settings;

/// RootAsAnsible command line
#[derive(Debug, Parser)]
#[command(name = "raa")]
#[command(about = "Least-privilege RootAsRole policies for Ansible playbooks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ./raa.toml when present)
    #[arg(short, long, env = "RAA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tag elevated tasks of a tree in place
    Inject {
        /// Directory or single playbook
        root: PathBuf,
    },

    /// Merge the scenario policy into the base policy
    MergePolicy {
        /// Base policy (default: <templates>/sr_rootasrole.json)
        #[arg(long)]
        base: Option<PathBuf>,
        /// Reviewed scenario policy
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Policy generated by the discover run
        #[arg(long)]
        generated: Option<PathBuf>,
        /// Merged policy destination
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Copy, tag and observe the scenario
    Discover,

    /// Merge, push and replay the scenario under enforcement
    Enforce,

    /// Print the command line a become method runs for a tagged task
    Wrap {
        /// Tagged document holding the task
        #[arg(long)]
        document: PathBuf,
        /// Name of the task
        #[arg(long)]
        task: String,
        /// Become method to render for
        #[arg(long, value_enum, default_value_t = commands::BecomeMethod::Gensr)]
        method: commands::BecomeMethod,
        /// Shell command the become method wraps
        command: String,
    },
}

/// Run using the current process arguments
///
/// # Errors
/// Whatever the selected command reports
pub async fn run() -> anyhow::Result<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator
///
/// # Errors
/// Whatever the selected command reports
pub async fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let filter = if cli.verbose { "debug" } else { "info" };
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Inject { root } => {
            let report = commands::inject(&root)?;
            print(cli.json, &report)?;
        }
        Commands::MergePolicy {
            base,
            scenario,
            generated,
            output,
        } => {
            let defaults = settings.policy_paths();
            let paths = PolicyPaths {
                base: base.unwrap_or(defaults.base),
                scenario: scenario.unwrap_or(defaults.scenario),
                generated: generated.unwrap_or(defaults.generated),
                output: output.unwrap_or(defaults.output),
            };
            let summary = commands::merge_policy(&paths)?;
            print(cli.json, &summary)?;
        }
        Commands::Discover => {
            let report = commands::discover(&settings).await?;
            print(cli.json, &report)?;
        }
        Commands::Enforce => {
            let summary = commands::enforce(&settings).await?;
            print(cli.json, &summary)?;
        }
        Commands::Wrap {
            document,
            task,
            method,
            command,
        } => {
            let line = commands::wrap(&document, &task, method, &command)?;
            print(cli.json, &line)?;
        }
    }

    Ok(())
}

fn print<T>(json: bool, value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize + std::fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}
