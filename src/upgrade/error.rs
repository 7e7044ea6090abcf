// ABOUTME: Error types for the upgrade orchestration.
// ABOUTME: Covers the gate, pre-flight, provisioning, switchover, and cleanup failures.

use crate::provider::{DatabaseError, DeploymentError, DeploymentStatus, SnapshotError};
use crate::types::EngineVersion;

/// Errors that can occur while orchestrating an upgrade.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// The running version already matches the target.
    #[error("current version {0} matches the target version; no upgrade required")]
    NoUpgradeNeeded(EngineVersion),

    /// The running version is newer than the target.
    #[error("current version {current} is newer than target version {target}; downgrade is not supported")]
    UnsupportedDowngrade {
        current: EngineVersion,
        target: EngineVersion,
    },

    /// Pre-flight found active replication slots or flagged extensions.
    #[error("pre-flight blocked the upgrade: {0}")]
    PreflightBlocked(String),

    /// Database resource operation failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Blue/green deployment operation failed.
    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    /// Snapshot operation failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The switchover did not complete within the polling budget.
    /// Reported but not fatal; the caller decides whether to re-run.
    #[error("timed out waiting for switchover; last observed status: {last_status}")]
    SwitchoverTimeout { last_status: DeploymentStatus },
}
