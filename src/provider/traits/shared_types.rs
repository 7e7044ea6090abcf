// ABOUTME: Shared data types exchanged between the orchestrator and the provider.
// ABOUTME: Provider-neutral views of instances, clusters, deployments, and alarms.

use std::fmt;

use crate::types::{DbIdentifier, DeploymentId, EngineVersion, ParameterGroupName};

/// Whether an identifier resolved to a standalone instance or a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A standalone RDS PostgreSQL instance.
    Instance,
    /// An Aurora PostgreSQL cluster.
    Cluster,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Instance => write!(f, "instance"),
            TargetKind::Cluster => write!(f, "cluster"),
        }
    }
}

/// Read-only view of a resolved database resource.
#[derive(Debug, Clone)]
pub struct DbDescriptor {
    pub identifier: DbIdentifier,
    pub kind: TargetKind,
    pub arn: String,
    pub engine: String,
    pub engine_version: EngineVersion,
    pub backup_retention_days: i32,
    /// Instance-level parameter group, if attached.
    pub instance_parameter_group: Option<ParameterGroupName>,
    /// Cluster-level parameter group (clusters only).
    pub cluster_parameter_group: Option<ParameterGroupName>,
}

/// Status of a blue/green deployment as observed from the provider.
///
/// Terminal failure states are carried but not handled specially: the
/// switchover wait loop keeps polling until its own timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStatus {
    Provisioning,
    Available,
    SwitchoverInProgress,
    SwitchoverCompleted,
    InvalidConfiguration,
    SwitchoverFailed,
    Deleting,
    Other(String),
}

impl DeploymentStatus {
    pub fn from_provider(status: &str) -> Self {
        match status {
            "PROVISIONING" => DeploymentStatus::Provisioning,
            "AVAILABLE" => DeploymentStatus::Available,
            "SWITCHOVER_IN_PROGRESS" => DeploymentStatus::SwitchoverInProgress,
            "SWITCHOVER_COMPLETED" => DeploymentStatus::SwitchoverCompleted,
            "INVALID_CONFIGURATION" => DeploymentStatus::InvalidConfiguration,
            "SWITCHOVER_FAILED" => DeploymentStatus::SwitchoverFailed,
            "DELETING" => DeploymentStatus::Deleting,
            other => DeploymentStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Provisioning => write!(f, "PROVISIONING"),
            DeploymentStatus::Available => write!(f, "AVAILABLE"),
            DeploymentStatus::SwitchoverInProgress => write!(f, "SWITCHOVER_IN_PROGRESS"),
            DeploymentStatus::SwitchoverCompleted => write!(f, "SWITCHOVER_COMPLETED"),
            DeploymentStatus::InvalidConfiguration => write!(f, "INVALID_CONFIGURATION"),
            DeploymentStatus::SwitchoverFailed => write!(f, "SWITCHOVER_FAILED"),
            DeploymentStatus::Deleting => write!(f, "DELETING"),
            DeploymentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Transient view of a blue/green deployment. The provider owns the
/// deployment; we only hold its identifier for polling and deletion.
#[derive(Debug, Clone)]
pub struct BlueGreenDeployment {
    pub id: DeploymentId,
    pub name: String,
    /// Source (blue) resource reference, typically an ARN.
    pub source: String,
    /// Target (green) resource reference, typically an ARN.
    pub target: String,
    pub status: DeploymentStatus,
}

/// A single engine parameter, as copied between parameter groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbParameter {
    pub name: String,
    pub value: String,
}

/// An engine parameter as reported by the provider. Parameters still on
/// their engine default carry no explicit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineParameter {
    pub name: String,
    pub value: Option<String>,
}

/// Provider-neutral view of a metric alarm, rich enough to recreate it.
#[derive(Debug, Clone, Default)]
pub struct AlarmDefinition {
    pub name: String,
    pub description: Option<String>,
    pub actions_enabled: Option<bool>,
    pub ok_actions: Vec<String>,
    pub alarm_actions: Vec<String>,
    pub insufficient_data_actions: Vec<String>,
    pub metric_name: Option<String>,
    pub namespace: Option<String>,
    pub statistic: Option<String>,
    pub extended_statistic: Option<String>,
    pub dimensions: Vec<AlarmDimension>,
    pub period: Option<i32>,
    pub unit: Option<String>,
    pub evaluation_periods: Option<i32>,
    pub datapoints_to_alarm: Option<i32>,
    pub threshold: Option<f64>,
    pub comparison_operator: Option<String>,
    pub treat_missing_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDimension {
    pub name: String,
    pub value: String,
}

/// Summary row used when surveying the fleet for outdated engines.
#[derive(Debug, Clone)]
pub struct DbSummary {
    pub identifier: String,
    pub engine: String,
    pub engine_version: EngineVersion,
}
