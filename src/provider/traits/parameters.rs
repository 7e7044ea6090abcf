// ABOUTME: Parameter group operations trait.
// ABOUTME: Create groups and copy user-overridden parameters across families.

use async_trait::async_trait;

use super::sealed::Sealed;
use super::shared_types::{DbParameter, EngineParameter};
use crate::types::ParameterGroupName;

/// Operations on instance- and cluster-level parameter groups.
#[async_trait]
pub trait ParameterOps: Sealed + Send + Sync {
    async fn create_instance_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> Result<ParameterGroupName, ParameterError>;

    async fn create_cluster_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> Result<ParameterGroupName, ParameterError>;

    /// Parameters with source `user` in an instance group, i.e. values an
    /// operator has overridden away from the engine defaults.
    async fn user_instance_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<DbParameter>, ParameterError>;

    /// Parameters with source `user` in a cluster group.
    async fn user_cluster_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<DbParameter>, ParameterError>;

    /// Every parameter in an instance group, engine defaults included.
    async fn instance_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<EngineParameter>, ParameterError>;

    /// Every parameter in a cluster group, engine defaults included.
    async fn cluster_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<EngineParameter>, ParameterError>;

    /// Apply parameters to an instance group with pending-reboot effect.
    async fn apply_instance_parameters(
        &self,
        group: &ParameterGroupName,
        parameters: &[DbParameter],
    ) -> Result<(), ParameterError>;

    /// Apply parameters to a cluster group with pending-reboot effect.
    async fn apply_cluster_parameters(
        &self,
        group: &ParameterGroupName,
        parameters: &[DbParameter],
    ) -> Result<(), ParameterError>;
}

/// Errors from parameter group operations.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter group '{0}' does not exist")]
    GroupNotFound(String),

    #[error("failed to create parameter group: {0}")]
    CreateFailed(String),

    #[error("target version '{0}' has no numeric major component")]
    InvalidTargetVersion(String),

    #[error("provider error: {0}")]
    Api(String),
}
