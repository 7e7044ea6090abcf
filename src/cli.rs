// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "relevo")]
#[command(about = "Blue/green major version upgrades for managed PostgreSQL")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run or resume a blue/green upgrade to the target engine version
    Upgrade {
        /// Instance or cluster identifier
        #[arg(short, long)]
        identifier: String,

        /// Target engine version, e.g. 15.8
        #[arg(short, long)]
        target_version: String,
    },

    /// Check replication slots and extensions without changing anything
    Preflight {
        /// Instance or cluster identifier
        #[arg(short, long)]
        identifier: String,
    },

    /// Migrate parameter groups to the target version's family
    Parameters {
        /// Instance or cluster identifier
        #[arg(short, long)]
        identifier: String,

        /// Target engine version, e.g. 15.8
        #[arg(short, long)]
        target_version: String,
    },

    /// Review replication-relevant engine parameters, optionally changing them
    ReplicationParams {
        /// Instance or cluster identifier
        #[arg(short, long)]
        identifier: String,

        /// Override a parameter, e.g. --set max_wal_senders=35 (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Recreate metric alarms against a new resource
    Alarms {
        /// Identifier the existing alarms reference
        #[arg(long)]
        source: String,

        /// Identifier the new alarms should watch
        #[arg(long)]
        target: String,
    },

    /// List instances and clusters running outdated engine versions
    Outdated {
        /// Only report versions strictly below this one
        #[arg(long)]
        max_version: Option<String>,
    },
}
