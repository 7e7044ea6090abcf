// ABOUTME: AWS environment validation and SDK configuration loading.
// ABOUTME: Fails fast on missing credentials before any API call is made.

use aws_config::{BehaviorVersion, SdkConfig};
use thiserror::Error;

/// Environment variables that must be present before the tool talks to AWS.
pub const REQUIRED_ENV_VARS: [&str; 4] = [
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
];

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("missing required environment variables: {0}")]
    MissingVars(String),
}

/// Validated AWS environment, ready to build SDK clients from.
#[derive(Debug, Clone)]
pub struct AwsEnv {
    region: String,
}

impl AwsEnv {
    /// Check that every required variable is set. All missing variables are
    /// reported together so the operator can fix them in one pass.
    pub fn validate() -> Result<Self, EnvError> {
        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|var| std::env::var(var).is_err())
            .collect();

        if !missing.is_empty() {
            return Err(EnvError::MissingVars(missing.join(", ")));
        }

        // validate() guarantees AWS_REGION is set.
        let region = std::env::var("AWS_REGION").unwrap_or_default();
        Ok(Self { region })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Load the shared SDK configuration from the environment.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        aws_config::load_defaults(BehaviorVersion::latest()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_all_missing_vars() {
        temp_env::with_vars(
            [
                ("AWS_REGION", None),
                ("AWS_ACCESS_KEY_ID", Some("test-value")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-value")),
                ("AWS_SESSION_TOKEN", None),
            ],
            || {
                let err = AwsEnv::validate().unwrap_err();
                let message = err.to_string();
                assert!(message.contains("AWS_REGION"));
                assert!(message.contains("AWS_SESSION_TOKEN"));
                assert!(!message.contains("AWS_ACCESS_KEY_ID"));
            },
        );
    }

    #[test]
    fn validate_succeeds_with_full_environment() {
        temp_env::with_vars(
            [
                ("AWS_REGION", Some("eu-west-1")),
                ("AWS_ACCESS_KEY_ID", Some("test-value")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-value")),
                ("AWS_SESSION_TOKEN", Some("test-value")),
            ],
            || {
                let env = AwsEnv::validate().unwrap();
                assert_eq!(env.region(), "eu-west-1");
            },
        );
    }
}
