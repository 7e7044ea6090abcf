// ABOUTME: AWS-backed provider holding the RDS, CloudWatch, and Secrets Manager clients.
// ABOUTME: Verifies caller identity once at construction time.

mod cloudwatch;
mod rds;
mod secrets;

use tracing::info;

use super::error::ProviderError;
use super::traits::sealed::Sealed;
use crate::config::AwsEnv;

/// Provider implementation backed by the AWS SDK.
///
/// One instance serves a whole invocation; all capability traits are
/// implemented on it so the orchestrator can take `impl DatabaseOps +
/// BlueGreenOps + ...` bounds and tests can substitute mocks.
pub struct AwsProvider {
    rds: aws_sdk_rds::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    secrets: aws_sdk_secretsmanager::Client,
    account_id: String,
}

impl Sealed for AwsProvider {}

impl AwsProvider {
    /// Build clients from a validated environment and verify the caller
    /// identity with STS before anything else runs.
    pub async fn connect(env: &AwsEnv) -> Result<Self, ProviderError> {
        let sdk_config = env.load_sdk_config().await;

        let sts = aws_sdk_sts::Client::new(&sdk_config);
        let identity = sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ProviderError::Identity {
                message: e.to_string(),
            })?;
        let account_id = identity.account().unwrap_or_default().to_string();
        info!(account = %account_id, region = env.region(), "verified AWS caller identity");

        Ok(Self {
            rds: aws_sdk_rds::Client::new(&sdk_config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&sdk_config),
            secrets: aws_sdk_secretsmanager::Client::new(&sdk_config),
            account_id,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub(crate) fn rds(&self) -> &aws_sdk_rds::Client {
        &self.rds
    }

    pub(crate) fn cloudwatch(&self) -> &aws_sdk_cloudwatch::Client {
        &self.cloudwatch
    }

    pub(crate) fn secrets(&self) -> &aws_sdk_secretsmanager::Client {
        &self.secrets
    }
}
