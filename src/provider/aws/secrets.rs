// ABOUTME: Secrets Manager-backed implementation of the secret retrieval trait.
// ABOUTME: Parses the stored JSON record into the connection secret shape.

use async_trait::async_trait;
use tracing::debug;

use super::AwsProvider;
use crate::provider::traits::{DbSecret, SecretError, SecretOps};

#[async_trait]
impl SecretOps for AwsProvider {
    async fn connection_secret(&self, secret_id: &str) -> Result<DbSecret, SecretError> {
        debug!(secret_id, "fetching connection secret");
        let output = self
            .secrets()
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_resource_not_found_exception() {
                    SecretError::NotFound(secret_id.to_string())
                } else {
                    SecretError::Api(service_err.to_string())
                }
            })?;

        let raw = output
            .secret_string()
            .ok_or_else(|| SecretError::NoStringPayload(secret_id.to_string()))?;
        DbSecret::from_json(raw)
    }
}
