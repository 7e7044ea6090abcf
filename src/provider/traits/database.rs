// ABOUTME: Database resource operations trait.
// ABOUTME: Resolve identifiers, mutate retention, and delete instances and clusters.

use async_trait::async_trait;
use std::time::Duration;

use super::sealed::Sealed;
use super::shared_types::{DbDescriptor, DbSummary, TargetKind};
use crate::types::{DbIdentifier, InstanceId};

/// Operations on database instances and clusters.
#[async_trait]
pub trait DatabaseOps: Sealed + Send + Sync {
    /// Classify an identifier as a cluster or a standalone instance and
    /// fetch its descriptor. Cluster lookup is attempted first; an
    /// identifier that matches neither, or whose engine is not in the
    /// PostgreSQL family, is a `DatabaseError::NotFound`.
    async fn resolve(&self, identifier: &DbIdentifier) -> Result<DbDescriptor, DatabaseError>;

    /// Set the backup retention period, applying immediately.
    async fn set_backup_retention(
        &self,
        descriptor: &DbDescriptor,
        days: i32,
    ) -> Result<(), DatabaseError>;

    /// Block until the resource reports an available status again after a
    /// modification, or the timeout elapses.
    async fn wait_until_available(
        &self,
        descriptor: &DbDescriptor,
        timeout: Duration,
    ) -> Result<(), DatabaseError>;

    /// Turn off deletion protection ahead of a delete.
    async fn disable_deletion_protection(
        &self,
        kind: TargetKind,
        identifier: &str,
    ) -> Result<(), DatabaseError>;

    /// List the member instances of a cluster.
    async fn list_cluster_members(&self, cluster: &str) -> Result<Vec<InstanceId>, DatabaseError>;

    /// Delete an instance, skipping the final snapshot and retaining
    /// automated backups.
    async fn delete_instance(&self, identifier: &str) -> Result<(), DatabaseError>;

    /// Delete a cluster, skipping the final snapshot and retaining
    /// automated backups. The provider rejects this while member instances
    /// still exist.
    async fn delete_cluster(&self, identifier: &str) -> Result<(), DatabaseError>;

    /// List every standalone instance in the region.
    async fn list_instances(&self) -> Result<Vec<DbSummary>, DatabaseError>;

    /// List every cluster in the region.
    async fn list_clusters(&self) -> Result<Vec<DbSummary>, DatabaseError>;
}

/// Errors from database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("identifier '{0}' does not match any instance or cluster")]
    NotFound(String),

    #[error("'{identifier}' runs unsupported engine '{engine}'")]
    UnsupportedEngine { identifier: String, engine: String },

    #[error("timed out waiting for '{0}' to become available")]
    AvailabilityTimeout(String),

    #[error("provider error: {0}")]
    Api(String),
}
