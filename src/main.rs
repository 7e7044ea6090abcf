// ABOUTME: Entry point for the relevo CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use relevo::config::AwsEnv;
use relevo::error::{Error, Result};
use relevo::output::{Output, OutputMode};
use relevo::provider::{AwsProvider, BlueGreenOps, DatabaseOps, DeploymentStatus};
use relevo::types::{DbIdentifier, EngineVersion};
use relevo::upgrade::{
    self, Provisioned, SwitchedOver, SwitchingOver, Upgrade, UpgradeError, UpgradeTarget,
};
use relevo::{alarms, params, preflight, prompt, replication, survey};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Window for the interactive snapshot confirmation.
const SNAPSHOT_PROMPT_WINDOW: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let env = AwsEnv::validate()?;

    match cli.command {
        Commands::Upgrade {
            identifier,
            target_version,
        } => {
            let identifier = DbIdentifier::new(&identifier)?;
            let target_version = EngineVersion::parse(&target_version);
            let provider = AwsProvider::connect(&env).await?;
            upgrade_command(&provider, &identifier, target_version, output).await
        }
        Commands::Preflight { identifier } => {
            let identifier = DbIdentifier::new(&identifier)?;
            let provider = AwsProvider::connect(&env).await?;
            let report = preflight::run(&provider, &identifier).await?;
            if report.blocked() {
                output.error(&report.summary());
                std::process::exit(1);
            }
            output.success("Pre-flight clean: no active slots or flagged extensions");
            Ok(())
        }
        Commands::Parameters {
            identifier,
            target_version,
        } => {
            let identifier = DbIdentifier::new(&identifier)?;
            let target_version = EngineVersion::parse(&target_version);
            let provider = AwsProvider::connect(&env).await?;
            let target = UpgradeTarget::resolve(&provider, &identifier, target_version)
                .await
                .map_err(Error::Upgrade)?;

            let outcome = params::migrate_parameter_groups(&provider, &target).await?;
            if outcome.skipped() {
                output.success("Minor upgrade: parameter groups unchanged");
            } else {
                if let Some(group) = &outcome.cluster_group {
                    output.progress(&format!(
                        "Cluster parameter group {group} ({} parameters copied)",
                        outcome.cluster_parameters_copied
                    ));
                }
                if let Some(group) = &outcome.instance_group {
                    output.progress(&format!(
                        "Instance parameter group {group} ({} parameters copied)",
                        outcome.instance_parameters_copied
                    ));
                }
                output.success("Parameter groups migrated");
            }
            Ok(())
        }
        Commands::ReplicationParams { identifier, set } => {
            let identifier = DbIdentifier::new(&identifier)?;
            // Reject malformed overrides before touching the provider.
            let changes = set
                .iter()
                .map(|raw| replication::parse_change(raw))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let provider = AwsProvider::connect(&env).await?;
            let descriptor = provider.resolve(&identifier).await?;

            for review in replication::review(&provider, &descriptor).await? {
                let value = review.value.as_deref().unwrap_or("not set");
                output.progress(&format!("{}: {}  ({})", review.name, value, review.doc));
            }

            if changes.is_empty() {
                output.success("Replication parameters reviewed");
            } else {
                replication::apply(&provider, &descriptor, &changes).await?;
                output.success(&format!(
                    "{} parameter(s) applied, pending reboot",
                    changes.len()
                ));
            }
            Ok(())
        }
        Commands::Alarms { source, target } => {
            let provider = AwsProvider::connect(&env).await?;
            let created = alarms::recreate(&provider, &source, &target).await?;
            output.success(&format!("Created {} alarm(s) for {target}", created.len()));
            Ok(())
        }
        Commands::Outdated { max_version } => {
            let provider = AwsProvider::connect(&env).await?;
            let max = max_version.map(|v| EngineVersion::parse(&v));
            let report = survey::outdated(&provider, max.as_ref()).await?;

            if report.is_empty() {
                output.success("No outdated databases found");
                return Ok(());
            }
            for db in &report.clusters {
                output.progress(&format!(
                    "cluster  {}  {} {}",
                    db.identifier, db.engine, db.engine_version
                ));
            }
            for db in &report.instances {
                output.progress(&format!(
                    "instance {}  {} {}",
                    db.identifier, db.engine, db.engine_version
                ));
            }
            output.success(&format!(
                "{} outdated database(s)",
                report.clusters.len() + report.instances.len()
            ));
            Ok(())
        }
    }
}

/// Run or resume the upgrade. Position in the workflow is re-derived from
/// live provider state on every invocation; there is no local progress file.
async fn upgrade_command(
    provider: &AwsProvider,
    identifier: &DbIdentifier,
    target_version: EngineVersion,
    output: &Output,
) -> Result<()> {
    let target = UpgradeTarget::resolve(provider, identifier, target_version)
        .await
        .map_err(Error::Upgrade)?;
    output.progress(&format!(
        "Resolved {} '{}' on engine version {}",
        target.kind(),
        target.identifier(),
        target.current_version()
    ));

    // An existing deployment takes precedence over the version gate: once
    // the switchover has happened the source already reports the target
    // version, and only cleanup remains.
    if let Some(existing) = provider.find_for_source(identifier).await? {
        output.progress(&format!(
            "Found existing blue/green deployment {} ({})",
            existing.id, existing.status
        ));
        return resume(provider, target, existing.id, existing.status, output).await;
    }

    let upgrade = match Upgrade::new(target) {
        Ok(upgrade) => upgrade,
        Err(UpgradeError::NoUpgradeNeeded(version)) => {
            output.success(&format!("Already on version {version}; nothing to do"));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    output.progress("Running pre-flight checks...");
    let report = preflight::run(provider, upgrade.target().identifier()).await?;
    let upgrade = upgrade.clear_preflight(&report).map_err(Error::Upgrade)?;

    let outcome = params::migrate_parameter_groups(provider, upgrade.target()).await?;
    if !outcome.skipped() {
        output.progress("Parameter groups migrated for the target version family");
    }

    // Only prompt when a human can answer; quiet and json runs are
    // unattended and get the same default as an expired prompt.
    let snapshot_confirmed = if output.is_interactive() {
        prompt::confirm(
            &format!(
                "Create a snapshot of {} '{}' before upgrading?",
                upgrade.target().kind(),
                upgrade.target().identifier()
            ),
            SNAPSHOT_PROMPT_WINDOW,
        )
        .await
    } else {
        false
    };

    output.progress("Creating blue/green deployment...");
    let provisioned = upgrade
        .provision(provider, snapshot_confirmed)
        .await
        .map_err(Error::Upgrade)?;

    output.success(&format!(
        "Blue/green deployment {} is provisioning; re-run to continue once it is available",
        provisioned.deployment()
    ));
    Ok(())
}

/// Continue a run from the observed deployment status, falling through
/// each stage as far as this invocation can get.
async fn resume(
    provider: &AwsProvider,
    target: UpgradeTarget,
    deployment: relevo::types::DeploymentId,
    status: DeploymentStatus,
    output: &Output,
) -> Result<()> {
    match status {
        DeploymentStatus::Provisioning => {
            output.success("Deployment is still provisioning; re-run once it is available");
            Ok(())
        }
        DeploymentStatus::Available => {
            let upgrade = Upgrade::<Provisioned>::adopt(target, deployment);
            output.progress("Initiating switchover...");
            let switching = upgrade.switchover(provider).await.map_err(Error::Upgrade)?;
            await_and_cleanup(provider, switching, output).await
        }
        DeploymentStatus::SwitchoverInProgress => {
            let switching = Upgrade::<SwitchingOver>::adopt(target, deployment);
            await_and_cleanup(provider, switching, output).await
        }
        DeploymentStatus::SwitchoverCompleted => {
            let switched = Upgrade::<SwitchedOver>::adopt(target, deployment);
            cleanup(provider, switched, output).await
        }
        other => {
            output.warn(&format!(
                "Deployment is in status {other}; nothing to do this run"
            ));
            Ok(())
        }
    }
}

async fn await_and_cleanup(
    provider: &AwsProvider,
    switching: Upgrade<SwitchingOver>,
    output: &Output,
) -> Result<()> {
    output.progress("Waiting for switchover to complete...");
    match switching
        .wait_for_switchover(
            provider,
            upgrade::SWITCHOVER_WAIT,
            upgrade::SWITCHOVER_POLL_INTERVAL,
        )
        .await
    {
        Ok(switched) => cleanup(provider, switched, output).await,
        Err((_, e)) => {
            // Timed out, not failed: the provider keeps working on it.
            output.warn(&format!("{e}; re-run to continue"));
            Ok(())
        }
    }
}

async fn cleanup(
    provider: &AwsProvider,
    switched: Upgrade<SwitchedOver>,
    output: &Output,
) -> Result<()> {
    output.progress("Deleting the blue/green wrapper and the superseded resource...");
    let completed = switched.cleanup(provider).await.map_err(Error::Upgrade)?;
    match completed.superseded() {
        Some(superseded) => output.success(&format!(
            "Upgrade complete; superseded resource '{superseded}' deleted"
        )),
        None => output.success("Upgrade complete"),
    }
    Ok(())
}
