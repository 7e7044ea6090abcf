// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod identifier;
mod version;

pub use id::{DeploymentId, InstanceId, ParameterGroupName, SnapshotId};
pub use identifier::{DbIdentifier, DbIdentifierError};
pub use version::EngineVersion;
