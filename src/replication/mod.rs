// ABOUTME: Review and tuning of the engine parameters that govern logical replication.
// ABOUTME: Blue/green deployments replicate logically, so these settings gate provisioning.

use tracing::info;

use crate::provider::{
    DbDescriptor, DbParameter, EngineParameter, ParameterError, ParameterOps, TargetKind,
};
use crate::types::ParameterGroupName;

/// Parameters worth checking before a blue/green deployment is provisioned,
/// each with the reference page describing its effect.
pub const REVIEWED_PARAMETERS: [(&str, &str); 8] = [
    (
        "max_replication_slots",
        "https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/Appendix.PostgreSQL.CommonDBATasks.html#Appendix.PostgreSQL.CommonDBATasks.ReplicationSlots",
    ),
    (
        "max_wal_senders",
        "https://www.postgresql.org/docs/current/runtime-config-replication.html",
    ),
    (
        "max_logical_replication_workers",
        "https://www.postgresql.org/docs/current/runtime-config-replication.html",
    ),
    (
        "max_worker_processes",
        "https://www.postgresql.org/docs/current/runtime-config-resource.html",
    ),
    (
        "rds.logical_replication",
        "https://docs.aws.amazon.com/AmazonRDS/latest/UserGuide/USER_PostgreSQL.Replication.html",
    ),
    (
        "autovacuum_max_workers",
        "https://www.postgresql.org/docs/current/runtime-config-autovacuum.html",
    ),
    (
        "max_parallel_workers",
        "https://www.postgresql.org/docs/current/runtime-config-resource.html",
    ),
    (
        "synchronous_commit",
        "https://www.postgresql.org/docs/current/runtime-config-wal.html#GUC-SYNCHRONOUS-COMMIT",
    ),
];

/// One reviewed parameter: its current value (engine default when `None`)
/// and the documentation page for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterReview {
    pub name: &'static str,
    pub value: Option<String>,
    pub doc: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    #[error("'{0}' is not a replication-relevant parameter")]
    UnknownParameter(String),

    #[error("malformed change '{0}', expected name=value")]
    MalformedChange(String),

    #[error("'{0}' has no parameter group attached")]
    NoParameterGroup(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Pick the replication-relevant entries out of a full parameter listing,
/// in review order. Parameters absent from the group still appear, with no
/// value, so the operator sees the engine default is in effect.
pub fn select(fetched: &[EngineParameter]) -> Vec<ParameterReview> {
    REVIEWED_PARAMETERS
        .iter()
        .map(|&(name, doc)| ParameterReview {
            name,
            value: fetched
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.value.clone()),
            doc,
        })
        .collect()
}

/// Parse a `name=value` override, accepting only reviewed parameters.
pub fn parse_change(raw: &str) -> Result<DbParameter, ReplicationError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| ReplicationError::MalformedChange(raw.to_string()))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(ReplicationError::MalformedChange(raw.to_string()));
    }
    if !REVIEWED_PARAMETERS.iter().any(|&(known, _)| known == name) {
        return Err(ReplicationError::UnknownParameter(name.to_string()));
    }
    Ok(DbParameter {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// The parameter group that governs replication settings: the cluster-level
/// group for Aurora, the instance-level group for standalone RDS.
fn governing_group(descriptor: &DbDescriptor) -> Result<&ParameterGroupName, ReplicationError> {
    let group = match descriptor.kind {
        TargetKind::Cluster => descriptor.cluster_parameter_group.as_ref(),
        TargetKind::Instance => descriptor.instance_parameter_group.as_ref(),
    };
    group.ok_or_else(|| ReplicationError::NoParameterGroup(descriptor.identifier.to_string()))
}

/// Fetch the governing group and report the replication-relevant parameters.
pub async fn review<P: ParameterOps>(
    provider: &P,
    descriptor: &DbDescriptor,
) -> Result<Vec<ParameterReview>, ReplicationError> {
    let group = governing_group(descriptor)?;
    let fetched = match descriptor.kind {
        TargetKind::Cluster => provider.cluster_parameters(group).await?,
        TargetKind::Instance => provider.instance_parameters(group).await?,
    };
    Ok(select(&fetched))
}

/// Apply overrides to the governing group, pending-reboot.
pub async fn apply<P: ParameterOps>(
    provider: &P,
    descriptor: &DbDescriptor,
    changes: &[DbParameter],
) -> Result<(), ReplicationError> {
    if changes.is_empty() {
        return Ok(());
    }
    let group = governing_group(descriptor)?;
    match descriptor.kind {
        TargetKind::Cluster => provider.apply_cluster_parameters(group, changes).await?,
        TargetKind::Instance => provider.apply_instance_parameters(group, changes).await?,
    }
    info!(group = %group, count = changes.len(), "replication parameters applied, pending reboot");
    Ok(())
}
