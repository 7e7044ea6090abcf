// ABOUTME: Application-wide error types for relevo.
// ABOUTME: Uses thiserror for ergonomic error handling.

use thiserror::Error;

use crate::config::EnvError;
use crate::preflight::PreflightError;
use crate::provider::{
    AlarmError, DatabaseError, DeploymentError, ParameterError, ProviderError, SecretError,
};
use crate::replication::ReplicationError;
use crate::types::DbIdentifierError;
use crate::upgrade::UpgradeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid identifier: {0}")]
    Identifier(#[from] DbIdentifierError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    #[error(transparent)]
    Upgrade(#[from] UpgradeError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Replication(#[from] ReplicationError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Alarm(#[from] AlarmError),
}

pub type Result<T> = std::result::Result<T, Error>;
