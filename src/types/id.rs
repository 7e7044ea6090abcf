// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Prevents accidental swapping of deployment, snapshot, and instance IDs.

use serde::{Serialize, Serializer};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Empty enums: never instantiated, no trait bounds needed.
pub enum DeploymentMarker {}
pub enum SnapshotMarker {}
pub enum InstanceMarker {}
pub enum ParameterGroupMarker {}

/// An identifier tagged with what it identifies, so a deployment id cannot
/// be handed to an operation expecting a snapshot id.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Manual impls: a derive would put bounds on the marker type.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

pub type DeploymentId = Id<DeploymentMarker>;
pub type SnapshotId = Id<SnapshotMarker>;
pub type InstanceId = Id<InstanceMarker>;
pub type ParameterGroupName = Id<ParameterGroupMarker>;
