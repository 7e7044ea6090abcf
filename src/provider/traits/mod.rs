// ABOUTME: Composable capability traits for the managed-database provider.
// ABOUTME: Defines DatabaseOps, BlueGreenOps, SnapshotOps, ParameterOps, AlarmOps, SecretOps.

mod alarms;
mod database;
mod deployment;
mod parameters;
pub(crate) mod sealed;
mod secrets;
mod shared_types;
mod snapshot;

pub use alarms::{AlarmError, AlarmOps};
pub use database::{DatabaseError, DatabaseOps};
pub use deployment::{BlueGreenOps, DeploymentError};
pub use parameters::{ParameterError, ParameterOps};
pub use secrets::{DbSecret, SecretError, SecretOps};
pub use shared_types::*;
pub use snapshot::{SnapshotError, SnapshotOps};
