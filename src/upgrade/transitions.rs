// ABOUTME: State transition methods for upgrade orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::marker::PhantomData;
use std::time::Duration;

use tracing::{info, warn};

use crate::preflight::PreflightReport;
use crate::provider::{BlueGreenOps, DatabaseOps, DeploymentStatus, SnapshotOps, TargetKind};
use crate::types::DeploymentId;

use super::error::UpgradeError;
use super::gate::{self, UpgradeDecision};
use super::state::{Cleared, Completed, Provisioned, SwitchedOver, SwitchingOver, Validated};
use super::target::UpgradeTarget;
use super::{AVAILABILITY_WAIT, SNAPSHOT_WAIT, SWITCHOVER_CALL_TIMEOUT_SECS};

/// Result type for transitions that report a non-fatal failure alongside
/// the unchanged state.
pub type TransitionResult<T, S> = Result<Upgrade<T>, (Upgrade<S>, UpgradeError)>;

/// An upgrade in progress, parameterized by its current state.
///
/// There is no persisted progress marker: a crashed run is resumed by
/// re-querying live provider state and adopting the machine at the
/// observed position.
#[derive(Debug)]
pub struct Upgrade<S> {
    pub(crate) target: UpgradeTarget,
    pub(crate) deployment: Option<DeploymentId>,
    pub(crate) superseded: Option<String>,
    pub(crate) _state: PhantomData<S>,
}

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Upgrade<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self) -> Upgrade<T> {
        Upgrade {
            target: self.target,
            deployment: self.deployment,
            superseded: self.superseded,
            _state: PhantomData,
        }
    }

    /// Internal helper to transition with a deployment reference.
    fn transition_with_deployment<T>(self, deployment: DeploymentId) -> Upgrade<T> {
        Upgrade {
            target: self.target,
            deployment: Some(deployment),
            superseded: self.superseded,
            _state: PhantomData,
        }
    }

    pub fn target(&self) -> &UpgradeTarget {
        &self.target
    }
}

// =============================================================================
// Entry: gate -> Validated
// =============================================================================

impl Upgrade<Validated> {
    /// Evaluate the version gate and enter the machine only when an
    /// upgrade is actually required. No provider calls are made here.
    pub fn new(target: UpgradeTarget) -> Result<Self, UpgradeError> {
        match gate::evaluate(target.current_version(), target.target_version()) {
            UpgradeDecision::Required => {
                info!(
                    current = %target.current_version(),
                    target = %target.target_version(),
                    "upgrade required"
                );
                Ok(Upgrade {
                    target,
                    deployment: None,
                    superseded: None,
                    _state: PhantomData,
                })
            }
            UpgradeDecision::NotNeeded => {
                Err(UpgradeError::NoUpgradeNeeded(target.current_version().clone()))
            }
            UpgradeDecision::Downgrade => Err(UpgradeError::UnsupportedDowngrade {
                current: target.current_version().clone(),
                target: target.target_version().clone(),
            }),
        }
    }

    /// Gate on the pre-flight report. A blocked report is a hard stop for
    /// this run; there is no retry or wait.
    pub fn clear_preflight(self, report: &PreflightReport) -> Result<Upgrade<Cleared>, UpgradeError> {
        if report.blocked() {
            return Err(UpgradeError::PreflightBlocked(report.summary()));
        }
        Ok(self.transition())
    }
}

// =============================================================================
// Cleared -> Provisioned
// =============================================================================

impl Upgrade<Cleared> {
    /// Provision the blue/green deployment. Side effects, in order: raise
    /// backup retention to at least one day if needed (waiting for the
    /// resource to settle), take the pre-upgrade snapshot when confirmed,
    /// then issue the creation call.
    ///
    /// Declining the snapshot skips only the snapshot, not the upgrade.
    #[must_use = "upgrade state must be used"]
    pub async fn provision<P: DatabaseOps + SnapshotOps + BlueGreenOps>(
        self,
        provider: &P,
        snapshot_confirmed: bool,
    ) -> Result<Upgrade<Provisioned>, UpgradeError> {
        let descriptor = self.target.descriptor();

        if descriptor.backup_retention_days < 1 {
            info!(
                identifier = %descriptor.identifier,
                "backup retention below one day; raising to 1"
            );
            provider.set_backup_retention(descriptor, 1).await?;
            provider
                .wait_until_available(descriptor, AVAILABILITY_WAIT)
                .await?;
        }

        if snapshot_confirmed {
            let name = self.target.snapshot_name();
            let snapshot = provider.create_snapshot(descriptor, &name).await?;
            provider
                .wait_until_snapshot_available(descriptor.kind, &snapshot, SNAPSHOT_WAIT)
                .await?;
        } else {
            info!(
                identifier = %descriptor.identifier,
                "pre-upgrade snapshot skipped"
            );
        }

        let deployment = provider
            .create(
                &self.target.deployment_name(),
                &descriptor.arn,
                self.target.target_version(),
            )
            .await?;

        Ok(self.transition_with_deployment(deployment.id))
    }
}

// =============================================================================
// Provisioned -> SwitchingOver
// =============================================================================

impl Upgrade<Provisioned> {
    /// Adopt a deployment observed as AVAILABLE on a previous run.
    pub fn adopt(target: UpgradeTarget, deployment: DeploymentId) -> Self {
        Upgrade::<Provisioned> {
            target,
            deployment: None,
            superseded: None,
            _state: PhantomData,
        }
        .transition_with_deployment(deployment)
    }

    pub fn deployment(&self) -> &DeploymentId {
        self.deployment
            .as_ref()
            .expect("provisioned upgrade must hold a deployment")
    }

    /// Read the live deployment status.
    pub async fn status<P: BlueGreenOps>(
        &self,
        provider: &P,
    ) -> Result<DeploymentStatus, UpgradeError> {
        Ok(provider.status(self.deployment()).await?)
    }

    /// Initiate the switchover with the fixed provider-side timeout budget.
    /// Completion is not awaited here; the next state polls for it.
    #[must_use = "upgrade state must be used"]
    pub async fn switchover<P: BlueGreenOps>(
        self,
        provider: &P,
    ) -> Result<Upgrade<SwitchingOver>, UpgradeError> {
        provider
            .switchover(self.deployment(), SWITCHOVER_CALL_TIMEOUT_SECS)
            .await?;
        Ok(self.transition())
    }
}

// =============================================================================
// SwitchingOver -> SwitchedOver
// =============================================================================

impl Upgrade<SwitchingOver> {
    /// Adopt a deployment observed as SWITCHOVER_IN_PROGRESS on a previous run.
    pub fn adopt(target: UpgradeTarget, deployment: DeploymentId) -> Self {
        Upgrade::<SwitchingOver> {
            target,
            deployment: None,
            superseded: None,
            _state: PhantomData,
        }
        .transition_with_deployment(deployment)
    }

    /// Poll the deployment status until completion or until the timeout
    /// elapses. At least one status check is always issued. On timeout the
    /// machine is handed back with the last observed status; the caller
    /// decides whether to re-run.
    #[must_use = "upgrade state must be used"]
    pub async fn wait_for_switchover<P: BlueGreenOps>(
        self,
        provider: &P,
        timeout: Duration,
        interval: Duration,
    ) -> TransitionResult<SwitchedOver, SwitchingOver> {
        let start = tokio::time::Instant::now();
        let mut last_status = DeploymentStatus::SwitchoverInProgress;

        loop {
            let observed = provider.status(self.deployment()).await;
            match observed {
                Ok(status) => {
                    info!(status = %status, "waiting for switchover to complete");
                    if status == DeploymentStatus::SwitchoverCompleted {
                        info!(
                            elapsed_secs = start.elapsed().as_secs(),
                            "switchover completed"
                        );
                        return Ok(self.transition());
                    }
                    last_status = status;
                }
                Err(e) => {
                    // Transient describe failures are not fatal mid-wait.
                    warn!(error = %e, "status check failed; continuing to poll");
                }
            }

            if start.elapsed() >= timeout {
                return Err((self, UpgradeError::SwitchoverTimeout { last_status }));
            }
            tokio::time::sleep(interval).await;
        }
    }

    fn deployment(&self) -> &DeploymentId {
        self.deployment
            .as_ref()
            .expect("switching upgrade must hold a deployment")
    }
}

// =============================================================================
// SwitchedOver -> Completed
// =============================================================================

impl Upgrade<SwitchedOver> {
    /// Adopt a deployment observed as SWITCHOVER_COMPLETED on a previous run.
    pub fn adopt(target: UpgradeTarget, deployment: DeploymentId) -> Self {
        Upgrade::<SwitchedOver> {
            target,
            deployment: None,
            superseded: None,
            _state: PhantomData,
        }
        .transition_with_deployment(deployment)
    }

    /// Delete the blue/green wrapper, then the superseded resource it
    /// pointed at. Member instances of a cluster are deleted before the
    /// cluster itself; the provider rejects the reverse order.
    #[must_use = "upgrade state must be used"]
    pub async fn cleanup<P: DatabaseOps + BlueGreenOps>(
        self,
        provider: &P,
    ) -> Result<Upgrade<Completed>, UpgradeError> {
        let deployment = self
            .deployment
            .as_ref()
            .expect("switched-over upgrade must hold a deployment");

        let superseded = provider.delete(deployment).await?;
        info!(superseded, "deleting superseded resource");

        provider
            .disable_deletion_protection(self.target.kind(), &superseded)
            .await?;

        match self.target.kind() {
            TargetKind::Cluster => {
                let members = provider.list_cluster_members(&superseded).await?;
                for member in &members {
                    provider.delete_instance(member.as_str()).await?;
                }
                provider.delete_cluster(&superseded).await?;
            }
            TargetKind::Instance => {
                provider.delete_instance(&superseded).await?;
            }
        }

        let mut next: Upgrade<Completed> = self.transition();
        next.superseded = Some(superseded);
        Ok(next)
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl Upgrade<Completed> {
    /// Identifier of the deleted blue resource, when cleanup ran this run.
    pub fn superseded(&self) -> Option<&str> {
        self.superseded.as_deref()
    }

    /// Consume the upgrade and return the target.
    pub fn finish(self) -> UpgradeTarget {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        BlueGreenDeployment, DatabaseError, DbDescriptor, DbSummary, DeploymentError,
        SnapshotError,
    };
    use crate::types::{DbIdentifier, EngineVersion, InstanceId, SnapshotId};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn descriptor(kind: TargetKind, retention: i32) -> DbDescriptor {
        DbDescriptor {
            identifier: DbIdentifier::new("orders-prod").unwrap(),
            kind,
            arn: "arn:aws:rds:eu-west-1:123456789012:db:orders-prod".to_string(),
            engine: "postgres".to_string(),
            engine_version: EngineVersion::parse("13.4"),
            backup_retention_days: retention,
            instance_parameter_group: None,
            cluster_parameter_group: None,
        }
    }

    fn target(kind: TargetKind, retention: i32) -> UpgradeTarget {
        UpgradeTarget::new(descriptor(kind, retention), EngineVersion::parse("15.8"))
    }

    /// Records every provider call and serves canned statuses.
    #[derive(Default)]
    struct MockProvider {
        calls: Mutex<Vec<String>>,
        statuses: Mutex<VecDeque<DeploymentStatus>>,
        members: Vec<String>,
    }

    impl MockProvider {
        fn with_statuses(statuses: Vec<DeploymentStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                ..Default::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn status_checks(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.as_str() == "status")
                .count()
        }
    }

    impl crate::provider::sealed::Sealed for MockProvider {}

    #[async_trait]
    impl DatabaseOps for MockProvider {
        async fn resolve(&self, _: &DbIdentifier) -> Result<DbDescriptor, DatabaseError> {
            unimplemented!("not used by transition tests")
        }

        async fn set_backup_retention(
            &self,
            _: &DbDescriptor,
            days: i32,
        ) -> Result<(), DatabaseError> {
            self.record(format!("set_backup_retention:{days}"));
            Ok(())
        }

        async fn wait_until_available(
            &self,
            _: &DbDescriptor,
            _: Duration,
        ) -> Result<(), DatabaseError> {
            self.record("wait_until_available");
            Ok(())
        }

        async fn disable_deletion_protection(
            &self,
            _: TargetKind,
            identifier: &str,
        ) -> Result<(), DatabaseError> {
            self.record(format!("disable_deletion_protection:{identifier}"));
            Ok(())
        }

        async fn list_cluster_members(
            &self,
            cluster: &str,
        ) -> Result<Vec<InstanceId>, DatabaseError> {
            self.record(format!("list_cluster_members:{cluster}"));
            Ok(self
                .members
                .iter()
                .map(|m| InstanceId::new(m.clone()))
                .collect())
        }

        async fn delete_instance(&self, identifier: &str) -> Result<(), DatabaseError> {
            self.record(format!("delete_instance:{identifier}"));
            Ok(())
        }

        async fn delete_cluster(&self, identifier: &str) -> Result<(), DatabaseError> {
            self.record(format!("delete_cluster:{identifier}"));
            Ok(())
        }

        async fn list_instances(&self) -> Result<Vec<DbSummary>, DatabaseError> {
            unimplemented!("not used by transition tests")
        }

        async fn list_clusters(&self) -> Result<Vec<DbSummary>, DatabaseError> {
            unimplemented!("not used by transition tests")
        }
    }

    #[async_trait]
    impl BlueGreenOps for MockProvider {
        async fn find_for_source(
            &self,
            _: &DbIdentifier,
        ) -> Result<Option<BlueGreenDeployment>, DeploymentError> {
            Ok(None)
        }

        async fn status(&self, _: &DeploymentId) -> Result<DeploymentStatus, DeploymentError> {
            self.record("status");
            let mut statuses = self.statuses.lock().unwrap();
            let status = statuses
                .pop_front()
                .unwrap_or(DeploymentStatus::SwitchoverInProgress);
            // Keep serving the last status once the queue drains.
            if statuses.is_empty() {
                statuses.push_back(status.clone());
            }
            Ok(status)
        }

        async fn create(
            &self,
            name: &str,
            source_arn: &str,
            _: &EngineVersion,
        ) -> Result<BlueGreenDeployment, DeploymentError> {
            self.record(format!("create:{name}"));
            Ok(BlueGreenDeployment {
                id: DeploymentId::new("bgd-0001".to_string()),
                name: name.to_string(),
                source: source_arn.to_string(),
                target: String::new(),
                status: DeploymentStatus::Provisioning,
            })
        }

        async fn switchover(&self, id: &DeploymentId, _: i32) -> Result<(), DeploymentError> {
            self.record(format!("switchover:{id}"));
            Ok(())
        }

        async fn delete(&self, id: &DeploymentId) -> Result<String, DeploymentError> {
            self.record(format!("delete_deployment:{id}"));
            Ok("orders-prod-old1".to_string())
        }
    }

    #[async_trait]
    impl SnapshotOps for MockProvider {
        async fn create_snapshot(
            &self,
            _: &DbDescriptor,
            name: &str,
        ) -> Result<SnapshotId, SnapshotError> {
            self.record("create_snapshot");
            Ok(SnapshotId::new(name.to_string()))
        }

        async fn wait_until_snapshot_available(
            &self,
            _: TargetKind,
            _: &SnapshotId,
            _: Duration,
        ) -> Result<(), SnapshotError> {
            self.record("wait_snapshot");
            Ok(())
        }
    }

    fn cleared(kind: TargetKind, retention: i32) -> Upgrade<Cleared> {
        Upgrade::new(target(kind, retention))
            .unwrap()
            .clear_preflight(&PreflightReport::clean())
            .unwrap()
    }

    #[tokio::test]
    async fn provision_raises_retention_then_snapshots_then_creates() {
        let provider = MockProvider::default();
        let upgrade = cleared(TargetKind::Instance, 0);

        let provisioned = upgrade.provision(&provider, true).await.unwrap();
        assert_eq!(provisioned.deployment().as_str(), "bgd-0001");

        assert_eq!(
            provider.calls(),
            vec![
                "set_backup_retention:1",
                "wait_until_available",
                "create_snapshot",
                "wait_snapshot",
                "create:bg-deployment-orders-prod",
            ]
        );
    }

    #[tokio::test]
    async fn provision_skips_retention_and_snapshot_when_unneeded() {
        let provider = MockProvider::default();
        let upgrade = cleared(TargetKind::Instance, 7);

        upgrade.provision(&provider, false).await.unwrap();

        assert_eq!(provider.calls(), vec!["create:bg-deployment-orders-prod"]);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_exits_early_on_completion() {
        let provider = MockProvider::with_statuses(vec![
            DeploymentStatus::SwitchoverInProgress,
            DeploymentStatus::SwitchoverCompleted,
        ]);
        let upgrade = Upgrade::<SwitchingOver>::adopt(
            target(TargetKind::Instance, 7),
            DeploymentId::new("bgd-0001".to_string()),
        );

        let result = upgrade
            .wait_for_switchover(
                &provider,
                Duration::from_secs(300),
                Duration::from_secs(30),
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(provider.status_checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_reporting_last_status() {
        let provider =
            MockProvider::with_statuses(vec![DeploymentStatus::SwitchoverInProgress]);
        let upgrade = Upgrade::<SwitchingOver>::adopt(
            target(TargetKind::Instance, 7),
            DeploymentId::new("bgd-0001".to_string()),
        );

        let result = upgrade
            .wait_for_switchover(&provider, Duration::from_secs(60), Duration::from_secs(30))
            .await;

        match result {
            Err((_, UpgradeError::SwitchoverTimeout { last_status })) => {
                assert_eq!(last_status, DeploymentStatus::SwitchoverInProgress);
            }
            _ => panic!("expected switchover timeout"),
        }
        // Checks at t=0, t=30, and t=60; never more than the budget allows.
        assert_eq!(provider.status_checks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_issues_at_least_one_check_with_zero_timeout() {
        let provider =
            MockProvider::with_statuses(vec![DeploymentStatus::SwitchoverInProgress]);
        let upgrade = Upgrade::<SwitchingOver>::adopt(
            target(TargetKind::Instance, 7),
            DeploymentId::new("bgd-0001".to_string()),
        );

        let result = upgrade
            .wait_for_switchover(&provider, Duration::ZERO, Duration::from_secs(30))
            .await;

        assert!(result.is_err());
        assert_eq!(provider.status_checks(), 1);
    }

    #[tokio::test]
    async fn cleanup_deletes_members_before_cluster() {
        let provider = MockProvider {
            members: vec!["member-1".to_string(), "member-2".to_string()],
            ..Default::default()
        };
        let upgrade = Upgrade::<SwitchedOver>::adopt(
            target(TargetKind::Cluster, 7),
            DeploymentId::new("bgd-0001".to_string()),
        );

        let completed = upgrade.cleanup(&provider).await.unwrap();
        assert_eq!(completed.superseded(), Some("orders-prod-old1"));

        let calls = provider.calls();
        assert_eq!(
            calls,
            vec![
                "delete_deployment:bgd-0001",
                "disable_deletion_protection:orders-prod-old1",
                "list_cluster_members:orders-prod-old1",
                "delete_instance:member-1",
                "delete_instance:member-2",
                "delete_cluster:orders-prod-old1",
            ]
        );

        // Ordering invariant: every member delete precedes the cluster delete.
        let cluster_delete = calls
            .iter()
            .position(|c| c.starts_with("delete_cluster"))
            .unwrap();
        for member in ["delete_instance:member-1", "delete_instance:member-2"] {
            let member_delete = calls.iter().position(|c| c == member).unwrap();
            assert!(member_delete < cluster_delete);
        }
    }

    #[tokio::test]
    async fn cleanup_deletes_standalone_instance_directly() {
        let provider = MockProvider::default();
        let upgrade = Upgrade::<SwitchedOver>::adopt(
            target(TargetKind::Instance, 7),
            DeploymentId::new("bgd-0001".to_string()),
        );

        upgrade.cleanup(&provider).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                "delete_deployment:bgd-0001",
                "disable_deletion_protection:orders-prod-old1",
                "delete_instance:orders-prod-old1",
            ]
        );
    }

    #[test]
    fn gate_refuses_downgrade_without_any_provider() {
        let err = Upgrade::new(UpgradeTarget::new(
            descriptor(TargetKind::Instance, 7),
            EngineVersion::parse("12.9"),
        ))
        .unwrap_err();
        assert!(matches!(err, UpgradeError::UnsupportedDowngrade { .. }));
    }

    #[test]
    fn gate_short_circuits_matching_versions() {
        let err = Upgrade::new(UpgradeTarget::new(
            descriptor(TargetKind::Instance, 7),
            EngineVersion::parse("13.4"),
        ))
        .unwrap_err();
        assert!(matches!(err, UpgradeError::NoUpgradeNeeded(_)));
    }

    #[test]
    fn preflight_block_is_a_hard_stop() {
        let report = PreflightReport::from_observations(
            vec!["slot_a".to_string()],
            &["pg_cron".to_string()],
        );
        let err = Upgrade::new(target(TargetKind::Instance, 7))
            .unwrap()
            .clear_preflight(&report)
            .unwrap_err();
        assert!(matches!(err, UpgradeError::PreflightBlocked(_)));
    }
}
