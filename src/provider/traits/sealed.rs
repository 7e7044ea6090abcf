// ABOUTME: Sealed trait pattern for provider traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Sealed trait to prevent external implementations.
///
/// This pattern allows us to add new methods to traits without breaking
/// semver. Only types that implement Sealed (our internal provider types)
/// can implement the capability traits.
pub trait Sealed {}
