// ABOUTME: Resolved upgrade target: descriptor plus requested engine version.
// ABOUTME: Derives deterministic deployment and snapshot names.

use chrono::Utc;

use crate::provider::{DatabaseOps, DbDescriptor, TargetKind};
use crate::types::{DbIdentifier, EngineVersion};

use super::error::UpgradeError;

/// Provider naming limit for blue/green deployment names.
const DEPLOYMENT_NAME_MAX: usize = 60;
const DEPLOYMENT_NAME_PREFIX: &str = "bg-deployment-";

/// A resolved upgrade target. Immutable once resolved; every later stage
/// reads from it.
#[derive(Debug, Clone)]
pub struct UpgradeTarget {
    descriptor: DbDescriptor,
    target_version: EngineVersion,
}

impl UpgradeTarget {
    /// Resolve the identifier against live provider state and pair it with
    /// the requested target version.
    pub async fn resolve<P: DatabaseOps>(
        provider: &P,
        identifier: &DbIdentifier,
        target_version: EngineVersion,
    ) -> Result<Self, UpgradeError> {
        let descriptor = provider.resolve(identifier).await?;
        Ok(Self {
            descriptor,
            target_version,
        })
    }

    /// Pair an already-fetched descriptor with the target version.
    pub fn new(descriptor: DbDescriptor, target_version: EngineVersion) -> Self {
        Self {
            descriptor,
            target_version,
        }
    }

    pub fn descriptor(&self) -> &DbDescriptor {
        &self.descriptor
    }

    pub fn identifier(&self) -> &DbIdentifier {
        &self.descriptor.identifier
    }

    pub fn kind(&self) -> TargetKind {
        self.descriptor.kind
    }

    pub fn current_version(&self) -> &EngineVersion {
        &self.descriptor.engine_version
    }

    pub fn target_version(&self) -> &EngineVersion {
        &self.target_version
    }

    /// Whether the requested jump crosses a major version boundary.
    /// Versions without a numeric major component never qualify.
    pub fn is_major_upgrade(&self) -> bool {
        match (self.current_version().major(), self.target_version.major()) {
            (Some(current), Some(target)) => target > current,
            _ => false,
        }
    }

    /// Deployment name derived deterministically from the identifier,
    /// truncated to the provider naming limit.
    pub fn deployment_name(&self) -> String {
        let budget = DEPLOYMENT_NAME_MAX - DEPLOYMENT_NAME_PREFIX.len();
        let identifier = self.descriptor.identifier.as_str();
        let truncated = &identifier[..identifier.len().min(budget)];
        format!("{DEPLOYMENT_NAME_PREFIX}{truncated}")
    }

    /// Timestamped snapshot name for the pre-upgrade snapshot.
    pub fn snapshot_name(&self) -> String {
        format!(
            "{}-snapshot-{}",
            self.descriptor.identifier,
            Utc::now().format("%Y%m%d%H%M%S")
        )
    }
}
