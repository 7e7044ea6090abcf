// ABOUTME: Parameter group migration for major version upgrades.
// ABOUTME: Creates groups in the target family and copies user overrides.

use tracing::{debug, info};

use crate::provider::{ParameterError, ParameterOps, TargetKind};
use crate::types::ParameterGroupName;
use crate::upgrade::UpgradeTarget;

/// What the migration did, per group level.
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    pub cluster_group: Option<ParameterGroupName>,
    pub instance_group: Option<ParameterGroupName>,
    pub cluster_parameters_copied: usize,
    pub instance_parameters_copied: usize,
}

impl MigrationOutcome {
    pub fn skipped(&self) -> bool {
        self.cluster_group.is_none() && self.instance_group.is_none()
    }
}

/// Create parameter groups in the target engine family and copy the user
/// overrides from the current groups into them, pending-reboot.
///
/// Minor upgrades keep their existing groups; the family only changes
/// across a major boundary, so anything else is a no-op.
pub async fn migrate_parameter_groups<P: ParameterOps>(
    provider: &P,
    target: &UpgradeTarget,
) -> Result<MigrationOutcome, ParameterError> {
    if !target.is_major_upgrade() {
        debug!("not a major upgrade; parameter groups unchanged");
        return Ok(MigrationOutcome::default());
    }

    let major = target
        .target_version()
        .major()
        .ok_or_else(|| ParameterError::InvalidTargetVersion(target.target_version().to_string()))?;
    let identifier = target.identifier();
    let descriptor = target.descriptor();

    let mut outcome = MigrationOutcome::default();

    match target.kind() {
        TargetKind::Cluster => {
            let family = format!("aurora-postgresql{major}");
            let description = format!("{family} Parameter group for {identifier}");

            if let Some(current) = &descriptor.cluster_parameter_group {
                let name = format!("{identifier}-cluster-pg{family}");
                let group = provider
                    .create_cluster_group(&name, &family, &description)
                    .await?;
                let parameters = provider.user_cluster_parameters(current).await?;
                if !parameters.is_empty() {
                    provider.apply_cluster_parameters(&group, &parameters).await?;
                }
                info!(group = %group, copied = parameters.len(), "cluster parameter group migrated");
                outcome.cluster_parameters_copied = parameters.len();
                outcome.cluster_group = Some(group);
            }

            if let Some(current) = &descriptor.instance_parameter_group {
                let name = format!("{identifier}-instance-pg{family}");
                let group = provider
                    .create_instance_group(&name, &family, &description)
                    .await?;
                let parameters = provider.user_instance_parameters(current).await?;
                if !parameters.is_empty() {
                    provider.apply_instance_parameters(&group, &parameters).await?;
                }
                info!(group = %group, copied = parameters.len(), "instance parameter group migrated");
                outcome.instance_parameters_copied = parameters.len();
                outcome.instance_group = Some(group);
            }
        }
        TargetKind::Instance => {
            let family = format!("postgres{major}");
            let description = format!("{family} Parameter group for {identifier}");

            if let Some(current) = &descriptor.instance_parameter_group {
                let name = format!("{identifier}-instance-pg{family}");
                let group = provider
                    .create_instance_group(&name, &family, &description)
                    .await?;
                let parameters = provider.user_instance_parameters(current).await?;
                if !parameters.is_empty() {
                    provider.apply_instance_parameters(&group, &parameters).await?;
                }
                info!(group = %group, copied = parameters.len(), "instance parameter group migrated");
                outcome.instance_parameters_copied = parameters.len();
                outcome.instance_group = Some(group);
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DbDescriptor, DbParameter};
    use crate::types::{DbIdentifier, EngineVersion};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockParams {
        calls: Mutex<Vec<String>>,
        user_parameters: Vec<DbParameter>,
    }

    impl MockParams {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl crate::provider::sealed::Sealed for MockParams {}

    #[async_trait]
    impl ParameterOps for MockParams {
        async fn create_instance_group(
            &self,
            name: &str,
            family: &str,
            _: &str,
        ) -> Result<ParameterGroupName, ParameterError> {
            self.record(format!("create_instance:{name}:{family}"));
            Ok(ParameterGroupName::new(name.to_string()))
        }

        async fn create_cluster_group(
            &self,
            name: &str,
            family: &str,
            _: &str,
        ) -> Result<ParameterGroupName, ParameterError> {
            self.record(format!("create_cluster:{name}:{family}"));
            Ok(ParameterGroupName::new(name.to_string()))
        }

        async fn user_instance_parameters(
            &self,
            group: &ParameterGroupName,
        ) -> Result<Vec<DbParameter>, ParameterError> {
            self.record(format!("user_instance:{group}"));
            Ok(self.user_parameters.clone())
        }

        async fn user_cluster_parameters(
            &self,
            group: &ParameterGroupName,
        ) -> Result<Vec<DbParameter>, ParameterError> {
            self.record(format!("user_cluster:{group}"));
            Ok(self.user_parameters.clone())
        }

        async fn instance_parameters(
            &self,
            group: &ParameterGroupName,
        ) -> Result<Vec<crate::provider::EngineParameter>, ParameterError> {
            self.record(format!("all_instance:{group}"));
            Ok(Vec::new())
        }

        async fn cluster_parameters(
            &self,
            group: &ParameterGroupName,
        ) -> Result<Vec<crate::provider::EngineParameter>, ParameterError> {
            self.record(format!("all_cluster:{group}"));
            Ok(Vec::new())
        }

        async fn apply_instance_parameters(
            &self,
            group: &ParameterGroupName,
            parameters: &[DbParameter],
        ) -> Result<(), ParameterError> {
            self.record(format!("apply_instance:{group}:{}", parameters.len()));
            Ok(())
        }

        async fn apply_cluster_parameters(
            &self,
            group: &ParameterGroupName,
            parameters: &[DbParameter],
        ) -> Result<(), ParameterError> {
            self.record(format!("apply_cluster:{group}:{}", parameters.len()));
            Ok(())
        }
    }

    fn target(kind: TargetKind, current: &str, requested: &str) -> UpgradeTarget {
        UpgradeTarget::new(
            DbDescriptor {
                identifier: DbIdentifier::new("orders-prod").unwrap(),
                kind,
                arn: "arn:aws:rds:eu-west-1:123456789012:db:orders-prod".to_string(),
                engine: match kind {
                    TargetKind::Cluster => "aurora-postgresql".to_string(),
                    TargetKind::Instance => "postgres".to_string(),
                },
                engine_version: EngineVersion::parse(current),
                backup_retention_days: 7,
                instance_parameter_group: Some(ParameterGroupName::new(
                    "current-instance-group".to_string(),
                )),
                cluster_parameter_group: match kind {
                    TargetKind::Cluster => Some(ParameterGroupName::new(
                        "current-cluster-group".to_string(),
                    )),
                    TargetKind::Instance => None,
                },
            },
            EngineVersion::parse(requested),
        )
    }

    #[tokio::test]
    async fn minor_upgrade_leaves_groups_alone() {
        let provider = MockParams::default();
        let outcome = migrate_parameter_groups(&provider, &target(TargetKind::Instance, "15.2", "15.8"))
            .await
            .unwrap();
        assert!(outcome.skipped());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn major_instance_upgrade_creates_target_family_group() {
        let provider = MockParams {
            user_parameters: vec![DbParameter {
                name: "work_mem".to_string(),
                value: "64MB".to_string(),
            }],
            ..Default::default()
        };
        let outcome = migrate_parameter_groups(&provider, &target(TargetKind::Instance, "13.4", "15.8"))
            .await
            .unwrap();

        assert_eq!(
            outcome.instance_group.as_ref().map(|g| g.as_str()),
            Some("orders-prod-instance-pgpostgres15")
        );
        assert_eq!(outcome.instance_parameters_copied, 1);
        assert_eq!(
            provider.calls(),
            vec![
                "create_instance:orders-prod-instance-pgpostgres15:postgres15",
                "user_instance:current-instance-group",
                "apply_instance:orders-prod-instance-pgpostgres15:1",
            ]
        );
    }

    #[tokio::test]
    async fn major_cluster_upgrade_migrates_both_levels() {
        let provider = MockParams::default();
        let outcome = migrate_parameter_groups(&provider, &target(TargetKind::Cluster, "13.4", "15.8"))
            .await
            .unwrap();

        assert_eq!(
            outcome.cluster_group.as_ref().map(|g| g.as_str()),
            Some("orders-prod-cluster-pgaurora-postgresql15")
        );
        assert_eq!(
            outcome.instance_group.as_ref().map(|g| g.as_str()),
            Some("orders-prod-instance-pgaurora-postgresql15")
        );
        // No user overrides, so nothing is applied.
        assert_eq!(
            provider.calls(),
            vec![
                "create_cluster:orders-prod-cluster-pgaurora-postgresql15:aurora-postgresql15",
                "user_cluster:current-cluster-group",
                "create_instance:orders-prod-instance-pgaurora-postgresql15:aurora-postgresql15",
                "user_instance:current-instance-group",
            ]
        );
    }
}
