// ABOUTME: Blue/green deployment operations trait.
// ABOUTME: Create, inspect, switch over, and delete managed staging environments.

use async_trait::async_trait;

use super::sealed::Sealed;
use super::shared_types::{BlueGreenDeployment, DeploymentStatus};
use crate::types::{DbIdentifier, DeploymentId, EngineVersion};

/// Operations on provider-managed blue/green deployments.
#[async_trait]
pub trait BlueGreenOps: Sealed + Send + Sync {
    /// Find an existing deployment whose source or target references the
    /// given identifier. Every run re-derives its position in the upgrade
    /// from this lookup; there is no local progress marker.
    async fn find_for_source(
        &self,
        identifier: &DbIdentifier,
    ) -> Result<Option<BlueGreenDeployment>, DeploymentError>;

    /// Read the current status of a deployment.
    async fn status(&self, id: &DeploymentId) -> Result<DeploymentStatus, DeploymentError>;

    /// Create a deployment staging the source at the target engine version.
    async fn create(
        &self,
        name: &str,
        source_arn: &str,
        target_engine_version: &EngineVersion,
    ) -> Result<BlueGreenDeployment, DeploymentError>;

    /// Initiate the switchover with a provider-side timeout budget. Returns
    /// as soon as the call is accepted; completion is observed by polling.
    async fn switchover(
        &self,
        id: &DeploymentId,
        timeout_secs: i32,
    ) -> Result<(), DeploymentError>;

    /// Delete the deployment wrapper. Returns the identifier of the
    /// superseded (blue) resource, parsed from the deployment's source
    /// reference, so the caller can delete it next.
    async fn delete(&self, id: &DeploymentId) -> Result<String, DeploymentError>;
}

/// Errors from blue/green deployment operations.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("no blue/green deployment found with identifier '{0}'")]
    NotFound(String),

    #[error("failed to create blue/green deployment: {0}")]
    CreateFailed(String),

    #[error("failed to initiate switchover: {0}")]
    SwitchoverFailed(String),

    #[error("provider error: {0}")]
    Api(String),
}
