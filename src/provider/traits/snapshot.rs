// ABOUTME: Snapshot operations trait.
// ABOUTME: Manual snapshots taken before an upgrade touches anything.

use async_trait::async_trait;
use std::time::Duration;

use super::sealed::Sealed;
use super::shared_types::{DbDescriptor, TargetKind};
use crate::types::SnapshotId;

/// Manual snapshot operations.
#[async_trait]
pub trait SnapshotOps: Sealed + Send + Sync {
    /// Create a manual snapshot of the instance or cluster.
    async fn create_snapshot(
        &self,
        descriptor: &DbDescriptor,
        name: &str,
    ) -> Result<SnapshotId, SnapshotError>;

    /// Block until the snapshot is available or the timeout elapses.
    async fn wait_until_snapshot_available(
        &self,
        kind: TargetKind,
        id: &SnapshotId,
        timeout: Duration,
    ) -> Result<(), SnapshotError>;
}

/// Errors from snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to create snapshot: {0}")]
    CreateFailed(String),

    #[error("timed out waiting for snapshot '{0}' to become available")]
    AvailabilityTimeout(String),

    #[error("provider error: {0}")]
    Api(String),
}
