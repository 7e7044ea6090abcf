// ABOUTME: RDS-backed implementations of the database, blue/green, snapshot, and parameter traits.
// ABOUTME: All listings use manual marker pagination; waits are plain poll-and-sleep loops.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use aws_sdk_rds::operation::delete_db_cluster::builders::DeleteDBClusterFluentBuilder;
use aws_sdk_rds::operation::delete_db_instance::builders::DeleteDBInstanceFluentBuilder;
use aws_sdk_rds::types::{ApplyMethod, Filter, Parameter};

use super::AwsProvider;
use crate::provider::traits::{
    BlueGreenDeployment, BlueGreenOps, DatabaseError, DatabaseOps, DbDescriptor, DbParameter,
    DbSummary, DeploymentError, DeploymentStatus, EngineParameter, ParameterError, ParameterOps,
    SnapshotError, SnapshotOps, TargetKind,
};
use crate::types::{
    DbIdentifier, DeploymentId, EngineVersion, InstanceId, ParameterGroupName, SnapshotId,
};

/// Fixed interval between status checks while waiting on the provider.
const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Extract the resource identifier from the trailing segment of an ARN,
/// e.g. `arn:aws:rds:eu-west-1:123456789012:db:orders-prod` -> `orders-prod`.
pub(crate) fn identifier_from_arn(arn: &str) -> String {
    let tail = arn.rsplit(':').next().unwrap_or(arn);
    tail.rsplit('/').next().unwrap_or(tail).to_string()
}

/// Delete request for a superseded instance: no final snapshot (one was
/// taken before the upgrade), automated backups retained.
fn delete_instance_request(
    rds: &aws_sdk_rds::Client,
    identifier: &str,
) -> DeleteDBInstanceFluentBuilder {
    rds.delete_db_instance()
        .db_instance_identifier(identifier)
        .skip_final_snapshot(true)
        .delete_automated_backups(false)
}

/// Delete request for a superseded cluster: same snapshot and backup
/// retention settings as the instance delete.
fn delete_cluster_request(
    rds: &aws_sdk_rds::Client,
    identifier: &str,
) -> DeleteDBClusterFluentBuilder {
    rds.delete_db_cluster()
        .db_cluster_identifier(identifier)
        .skip_final_snapshot(true)
        .delete_automated_backups(false)
}

fn cluster_filter(cluster: &str) -> Result<Filter, DatabaseError> {
    Ok(Filter::builder()
        .name("db-cluster-id")
        .values(cluster)
        .build())
}

#[async_trait]
impl DatabaseOps for AwsProvider {
    async fn resolve(&self, identifier: &DbIdentifier) -> Result<DbDescriptor, DatabaseError> {
        // Cluster lookup first; fall through to the instance lookup on
        // a not-found fault only.
        match self
            .rds()
            .describe_db_clusters()
            .db_cluster_identifier(identifier.as_str())
            .send()
            .await
        {
            Ok(output) => {
                if let Some(cluster) = output.db_clusters().first() {
                    let engine = cluster.engine().unwrap_or_default().to_string();
                    if engine != "aurora-postgresql" {
                        return Err(DatabaseError::UnsupportedEngine {
                            identifier: identifier.to_string(),
                            engine,
                        });
                    }
                    info!(%identifier, engine, "resolved Aurora cluster");
                    let instance_parameter_group =
                        self.first_member_parameter_group(identifier.as_str()).await?;
                    return Ok(DbDescriptor {
                        identifier: identifier.clone(),
                        kind: TargetKind::Cluster,
                        arn: cluster.db_cluster_arn().unwrap_or_default().to_string(),
                        engine,
                        engine_version: EngineVersion::parse(
                            cluster.engine_version().unwrap_or_default(),
                        ),
                        backup_retention_days: cluster.backup_retention_period().unwrap_or(0),
                        instance_parameter_group,
                        cluster_parameter_group: cluster
                            .db_cluster_parameter_group()
                            .map(|name| ParameterGroupName::new(name.to_string())),
                    });
                }
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if !service_err.is_db_cluster_not_found_fault() {
                    return Err(DatabaseError::Api(service_err.to_string()));
                }
            }
        }

        match self
            .rds()
            .describe_db_instances()
            .db_instance_identifier(identifier.as_str())
            .send()
            .await
        {
            Ok(output) => {
                if let Some(instance) = output.db_instances().first() {
                    let engine = instance.engine().unwrap_or_default().to_string();
                    if engine != "postgres" {
                        return Err(DatabaseError::UnsupportedEngine {
                            identifier: identifier.to_string(),
                            engine,
                        });
                    }
                    info!(%identifier, engine, "resolved RDS instance");
                    return Ok(DbDescriptor {
                        identifier: identifier.clone(),
                        kind: TargetKind::Instance,
                        arn: instance.db_instance_arn().unwrap_or_default().to_string(),
                        engine,
                        engine_version: EngineVersion::parse(
                            instance.engine_version().unwrap_or_default(),
                        ),
                        backup_retention_days: instance.backup_retention_period().unwrap_or(0),
                        instance_parameter_group: instance
                            .db_parameter_groups()
                            .first()
                            .and_then(|g| g.db_parameter_group_name())
                            .map(|name| ParameterGroupName::new(name.to_string())),
                        cluster_parameter_group: None,
                    });
                }
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if !service_err.is_db_instance_not_found_fault() {
                    return Err(DatabaseError::Api(service_err.to_string()));
                }
            }
        }

        Err(DatabaseError::NotFound(identifier.to_string()))
    }

    async fn set_backup_retention(
        &self,
        descriptor: &DbDescriptor,
        days: i32,
    ) -> Result<(), DatabaseError> {
        let identifier = descriptor.identifier.as_str();
        match descriptor.kind {
            TargetKind::Instance => {
                self.rds()
                    .modify_db_instance()
                    .db_instance_identifier(identifier)
                    .backup_retention_period(days)
                    .apply_immediately(true)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?;
            }
            TargetKind::Cluster => {
                self.rds()
                    .modify_db_cluster()
                    .db_cluster_identifier(identifier)
                    .backup_retention_period(days)
                    .apply_immediately(true)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?;
            }
        }
        info!(identifier, days, "backup retention period updated");
        Ok(())
    }

    async fn wait_until_available(
        &self,
        descriptor: &DbDescriptor,
        timeout: Duration,
    ) -> Result<(), DatabaseError> {
        let identifier = descriptor.identifier.as_str();
        let start = tokio::time::Instant::now();
        loop {
            let status = match descriptor.kind {
                TargetKind::Instance => self
                    .rds()
                    .describe_db_instances()
                    .db_instance_identifier(identifier)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?
                    .db_instances()
                    .first()
                    .and_then(|i| i.db_instance_status())
                    .unwrap_or_default()
                    .to_string(),
                TargetKind::Cluster => self
                    .rds()
                    .describe_db_clusters()
                    .db_cluster_identifier(identifier)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?
                    .db_clusters()
                    .first()
                    .and_then(|c| c.status())
                    .unwrap_or_default()
                    .to_string(),
            };

            if status == "available" {
                return Ok(());
            }
            debug!(identifier, status, "waiting for resource to become available");

            if start.elapsed() >= timeout {
                return Err(DatabaseError::AvailabilityTimeout(identifier.to_string()));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn disable_deletion_protection(
        &self,
        kind: TargetKind,
        identifier: &str,
    ) -> Result<(), DatabaseError> {
        match kind {
            TargetKind::Instance => {
                self.rds()
                    .modify_db_instance()
                    .db_instance_identifier(identifier)
                    .deletion_protection(false)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?;
            }
            TargetKind::Cluster => {
                self.rds()
                    .modify_db_cluster()
                    .db_cluster_identifier(identifier)
                    .deletion_protection(false)
                    .send()
                    .await
                    .map_err(|e| DatabaseError::Api(e.to_string()))?;
            }
        }
        info!(identifier, "deletion protection disabled");
        Ok(())
    }

    async fn list_cluster_members(&self, cluster: &str) -> Result<Vec<InstanceId>, DatabaseError> {
        let output = self
            .rds()
            .describe_db_instances()
            .filters(cluster_filter(cluster)?)
            .send()
            .await
            .map_err(|e| DatabaseError::Api(e.to_string()))?;

        Ok(output
            .db_instances()
            .iter()
            .filter_map(|i| i.db_instance_identifier())
            .map(|id| InstanceId::new(id.to_string()))
            .collect())
    }

    async fn delete_instance(&self, identifier: &str) -> Result<(), DatabaseError> {
        delete_instance_request(self.rds(), identifier)
            .send()
            .await
            .map_err(|e| DatabaseError::Api(e.to_string()))?;
        info!(identifier, "instance deletion initiated");
        Ok(())
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<(), DatabaseError> {
        delete_cluster_request(self.rds(), identifier)
            .send()
            .await
            .map_err(|e| DatabaseError::Api(e.to_string()))?;
        info!(identifier, "cluster deletion initiated");
        Ok(())
    }

    async fn list_instances(&self) -> Result<Vec<DbSummary>, DatabaseError> {
        let mut summaries = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .rds()
                .describe_db_instances()
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| DatabaseError::Api(e.to_string()))?;

            summaries.extend(output.db_instances().iter().map(|i| DbSummary {
                identifier: i.db_instance_identifier().unwrap_or_default().to_string(),
                engine: i.engine().unwrap_or_default().to_string(),
                engine_version: EngineVersion::parse(i.engine_version().unwrap_or_default()),
            }));

            marker = output.marker().map(|m| m.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(summaries)
    }

    async fn list_clusters(&self) -> Result<Vec<DbSummary>, DatabaseError> {
        let mut summaries = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .rds()
                .describe_db_clusters()
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| DatabaseError::Api(e.to_string()))?;

            summaries.extend(output.db_clusters().iter().map(|c| DbSummary {
                identifier: c.db_cluster_identifier().unwrap_or_default().to_string(),
                engine: c.engine().unwrap_or_default().to_string(),
                engine_version: EngineVersion::parse(c.engine_version().unwrap_or_default()),
            }));

            marker = output.marker().map(|m| m.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(summaries)
    }
}

impl AwsProvider {
    /// Parameter group attached to the first member instance of a cluster.
    /// All members are assumed to share the same group.
    async fn first_member_parameter_group(
        &self,
        cluster: &str,
    ) -> Result<Option<ParameterGroupName>, DatabaseError> {
        let output = self
            .rds()
            .describe_db_instances()
            .filters(cluster_filter(cluster)?)
            .send()
            .await
            .map_err(|e| DatabaseError::Api(e.to_string()))?;

        Ok(output
            .db_instances()
            .first()
            .and_then(|i| i.db_parameter_groups().first())
            .and_then(|g| g.db_parameter_group_name())
            .map(|name| ParameterGroupName::new(name.to_string())))
    }

    async fn fetch_instance_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<Parameter>, ParameterError> {
        let mut parameters = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .rds()
                .describe_db_parameters()
                .db_parameter_group_name(group.as_str())
                .set_marker(marker)
                .send()
                .await
                .map_err(|err| {
                    let service_err = err.into_service_error();
                    if service_err.is_db_parameter_group_not_found_fault() {
                        ParameterError::GroupNotFound(group.to_string())
                    } else {
                        ParameterError::Api(service_err.to_string())
                    }
                })?;

            parameters.extend(output.parameters().iter().cloned());

            marker = output.marker().map(|m| m.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(parameters)
    }

    async fn fetch_cluster_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<Parameter>, ParameterError> {
        let mut parameters = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .rds()
                .describe_db_cluster_parameters()
                .db_cluster_parameter_group_name(group.as_str())
                .set_marker(marker)
                .send()
                .await
                .map_err(|err| {
                    let service_err = err.into_service_error();
                    if service_err.is_db_parameter_group_not_found_fault() {
                        ParameterError::GroupNotFound(group.to_string())
                    } else {
                        ParameterError::Api(service_err.to_string())
                    }
                })?;

            parameters.extend(output.parameters().iter().cloned());

            marker = output.marker().map(|m| m.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(parameters)
    }
}

#[async_trait]
impl BlueGreenOps for AwsProvider {
    async fn find_for_source(
        &self,
        identifier: &DbIdentifier,
    ) -> Result<Option<BlueGreenDeployment>, DeploymentError> {
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .rds()
                .describe_blue_green_deployments()
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| DeploymentError::Api(e.to_string()))?;

            for deployment in output.blue_green_deployments() {
                let source = deployment.source().unwrap_or_default();
                let target = deployment.target().unwrap_or_default();
                if source.contains(identifier.as_str()) || target.contains(identifier.as_str()) {
                    return Ok(Some(BlueGreenDeployment {
                        id: DeploymentId::new(
                            deployment
                                .blue_green_deployment_identifier()
                                .unwrap_or_default()
                                .to_string(),
                        ),
                        name: deployment
                            .blue_green_deployment_name()
                            .unwrap_or_default()
                            .to_string(),
                        source: source.to_string(),
                        target: target.to_string(),
                        status: DeploymentStatus::from_provider(
                            deployment.status().unwrap_or_default(),
                        ),
                    }));
                }
            }

            marker = output.marker().map(|m| m.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(None)
    }

    async fn status(&self, id: &DeploymentId) -> Result<DeploymentStatus, DeploymentError> {
        let output = self
            .rds()
            .describe_blue_green_deployments()
            .blue_green_deployment_identifier(id.as_str())
            .send()
            .await
            .map_err(|e| DeploymentError::Api(e.to_string()))?;

        let deployment = output
            .blue_green_deployments()
            .first()
            .ok_or_else(|| DeploymentError::NotFound(id.to_string()))?;
        Ok(DeploymentStatus::from_provider(
            deployment.status().unwrap_or_default(),
        ))
    }

    async fn create(
        &self,
        name: &str,
        source_arn: &str,
        target_engine_version: &EngineVersion,
    ) -> Result<BlueGreenDeployment, DeploymentError> {
        let output = self
            .rds()
            .create_blue_green_deployment()
            .blue_green_deployment_name(name)
            .source(source_arn)
            .target_engine_version(target_engine_version.as_str())
            .send()
            .await
            .map_err(|e| DeploymentError::CreateFailed(e.to_string()))?;

        let deployment = output
            .blue_green_deployment()
            .ok_or_else(|| DeploymentError::CreateFailed("empty response".to_string()))?;
        let id = deployment
            .blue_green_deployment_identifier()
            .unwrap_or_default()
            .to_string();
        info!(deployment = %id, name, "blue/green deployment created");

        Ok(BlueGreenDeployment {
            id: DeploymentId::new(id),
            name: name.to_string(),
            source: deployment.source().unwrap_or_default().to_string(),
            target: deployment.target().unwrap_or_default().to_string(),
            status: DeploymentStatus::from_provider(deployment.status().unwrap_or_default()),
        })
    }

    async fn switchover(
        &self,
        id: &DeploymentId,
        timeout_secs: i32,
    ) -> Result<(), DeploymentError> {
        self.rds()
            .switchover_blue_green_deployment()
            .blue_green_deployment_identifier(id.as_str())
            .switchover_timeout(timeout_secs)
            .send()
            .await
            .map_err(|e| DeploymentError::SwitchoverFailed(e.to_string()))?;
        info!(deployment = %id, "switchover initiated");
        Ok(())
    }

    async fn delete(&self, id: &DeploymentId) -> Result<String, DeploymentError> {
        let output = self
            .rds()
            .delete_blue_green_deployment()
            .blue_green_deployment_identifier(id.as_str())
            .send()
            .await
            .map_err(|e| DeploymentError::Api(e.to_string()))?;

        let source = output
            .blue_green_deployment()
            .and_then(|d| d.source())
            .ok_or_else(|| DeploymentError::NotFound(id.to_string()))?;
        let superseded = identifier_from_arn(source);
        info!(deployment = %id, superseded, "blue/green deployment deletion initiated");
        Ok(superseded)
    }
}

#[async_trait]
impl SnapshotOps for AwsProvider {
    async fn create_snapshot(
        &self,
        descriptor: &DbDescriptor,
        name: &str,
    ) -> Result<SnapshotId, SnapshotError> {
        let identifier = descriptor.identifier.as_str();
        match descriptor.kind {
            TargetKind::Instance => {
                self.rds()
                    .create_db_snapshot()
                    .db_snapshot_identifier(name)
                    .db_instance_identifier(identifier)
                    .send()
                    .await
                    .map_err(|e| SnapshotError::CreateFailed(e.to_string()))?;
            }
            TargetKind::Cluster => {
                self.rds()
                    .create_db_cluster_snapshot()
                    .db_cluster_snapshot_identifier(name)
                    .db_cluster_identifier(identifier)
                    .send()
                    .await
                    .map_err(|e| SnapshotError::CreateFailed(e.to_string()))?;
            }
        }
        info!(identifier, snapshot = name, "snapshot creation initiated");
        Ok(SnapshotId::new(name.to_string()))
    }

    async fn wait_until_snapshot_available(
        &self,
        kind: TargetKind,
        id: &SnapshotId,
        timeout: Duration,
    ) -> Result<(), SnapshotError> {
        let start = tokio::time::Instant::now();
        loop {
            let status = match kind {
                TargetKind::Instance => self
                    .rds()
                    .describe_db_snapshots()
                    .db_snapshot_identifier(id.as_str())
                    .send()
                    .await
                    .map_err(|e| SnapshotError::Api(e.to_string()))?
                    .db_snapshots()
                    .first()
                    .and_then(|s| s.status())
                    .unwrap_or_default()
                    .to_string(),
                TargetKind::Cluster => self
                    .rds()
                    .describe_db_cluster_snapshots()
                    .db_cluster_snapshot_identifier(id.as_str())
                    .send()
                    .await
                    .map_err(|e| SnapshotError::Api(e.to_string()))?
                    .db_cluster_snapshots()
                    .first()
                    .and_then(|s| s.status())
                    .unwrap_or_default()
                    .to_string(),
            };

            if status == "available" {
                info!(snapshot = %id, "snapshot available");
                return Ok(());
            }
            debug!(snapshot = %id, status, "waiting for snapshot");

            if start.elapsed() >= timeout {
                return Err(SnapshotError::AvailabilityTimeout(id.to_string()));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ParameterOps for AwsProvider {
    async fn create_instance_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> Result<ParameterGroupName, ParameterError> {
        self.rds()
            .create_db_parameter_group()
            .db_parameter_group_name(name)
            .db_parameter_group_family(family)
            .description(description)
            .send()
            .await
            .map_err(|e| ParameterError::CreateFailed(e.to_string()))?;
        info!(group = name, family, "instance parameter group created");
        Ok(ParameterGroupName::new(name.to_string()))
    }

    async fn create_cluster_group(
        &self,
        name: &str,
        family: &str,
        description: &str,
    ) -> Result<ParameterGroupName, ParameterError> {
        self.rds()
            .create_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(name)
            .db_parameter_group_family(family)
            .description(description)
            .send()
            .await
            .map_err(|e| ParameterError::CreateFailed(e.to_string()))?;
        info!(group = name, family, "cluster parameter group created");
        Ok(ParameterGroupName::new(name.to_string()))
    }

    async fn user_instance_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<DbParameter>, ParameterError> {
        let raw = self.fetch_instance_parameters(group).await?;
        Ok(raw.iter().filter_map(user_parameter).collect())
    }

    async fn user_cluster_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<DbParameter>, ParameterError> {
        let raw = self.fetch_cluster_parameters(group).await?;
        Ok(raw.iter().filter_map(user_parameter).collect())
    }

    async fn instance_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<EngineParameter>, ParameterError> {
        let raw = self.fetch_instance_parameters(group).await?;
        Ok(raw.iter().filter_map(engine_parameter).collect())
    }

    async fn cluster_parameters(
        &self,
        group: &ParameterGroupName,
    ) -> Result<Vec<EngineParameter>, ParameterError> {
        let raw = self.fetch_cluster_parameters(group).await?;
        Ok(raw.iter().filter_map(engine_parameter).collect())
    }

    async fn apply_instance_parameters(
        &self,
        group: &ParameterGroupName,
        parameters: &[DbParameter],
    ) -> Result<(), ParameterError> {
        self.rds()
            .modify_db_parameter_group()
            .db_parameter_group_name(group.as_str())
            .set_parameters(Some(pending_reboot_parameters(parameters)))
            .send()
            .await
            .map_err(|e| ParameterError::Api(e.to_string()))?;
        info!(group = %group, count = parameters.len(), "instance parameters applied, pending reboot");
        Ok(())
    }

    async fn apply_cluster_parameters(
        &self,
        group: &ParameterGroupName,
        parameters: &[DbParameter],
    ) -> Result<(), ParameterError> {
        self.rds()
            .modify_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(group.as_str())
            .set_parameters(Some(pending_reboot_parameters(parameters)))
            .send()
            .await
            .map_err(|e| ParameterError::Api(e.to_string()))?;
        info!(group = %group, count = parameters.len(), "cluster parameters applied, pending reboot");
        Ok(())
    }
}

fn user_parameter(parameter: &Parameter) -> Option<DbParameter> {
    if parameter.source() != Some("user") {
        return None;
    }
    Some(DbParameter {
        name: parameter.parameter_name()?.to_string(),
        value: parameter.parameter_value()?.to_string(),
    })
}

fn engine_parameter(parameter: &Parameter) -> Option<EngineParameter> {
    Some(EngineParameter {
        name: parameter.parameter_name()?.to_string(),
        value: parameter.parameter_value().map(|v| v.to_string()),
    })
}

fn pending_reboot_parameters(parameters: &[DbParameter]) -> Vec<Parameter> {
    parameters
        .iter()
        .map(|p| {
            Parameter::builder()
                .parameter_name(&p.name)
                .parameter_value(&p.value)
                .apply_method(ApplyMethod::PendingReboot)
                .build()
        })
        .collect()
}
