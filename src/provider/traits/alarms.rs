// ABOUTME: Metric alarm operations trait.
// ABOUTME: List existing alarms and create retargeted copies.

use async_trait::async_trait;

use super::sealed::Sealed;
use super::shared_types::AlarmDefinition;

/// Operations on monitoring alarms.
#[async_trait]
pub trait AlarmOps: Sealed + Send + Sync {
    /// List every metric alarm in the region.
    async fn list_alarms(&self) -> Result<Vec<AlarmDefinition>, AlarmError>;

    /// Create or overwrite a metric alarm.
    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<(), AlarmError>;
}

/// Errors from alarm operations.
#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("failed to create alarm '{name}': {message}")]
    PutFailed { name: String, message: String },

    #[error("provider error: {0}")]
    Api(String),
}
