// ABOUTME: Provider construction error types with SNAFU pattern.
// ABOUTME: Unifies environment and identity failures for programmatic handling.

use snafu::Snafu;

use crate::config::EnvError;

/// Unified error for building a provider connection.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    #[snafu(display("environment validation failed: {source}"))]
    Environment { source: EnvError },

    #[snafu(display("could not verify caller identity: {message}"))]
    Identity { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Required environment variables are missing.
    MissingEnvironment,
    /// Credentials are present but the identity check failed.
    IdentityCheckFailed,
}

impl ProviderError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Environment { .. } => ProviderErrorKind::MissingEnvironment,
            ProviderError::Identity { .. } => ProviderErrorKind::IdentityCheckFailed,
        }
    }
}

impl From<EnvError> for ProviderError {
    fn from(source: EnvError) -> Self {
        ProviderError::Environment { source }
    }
}
