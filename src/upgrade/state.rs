// ABOUTME: Upgrade state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid transition ordering at compile time.

/// Version gate passed: an upgrade is required.
/// Available actions: `clear_preflight()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated;

/// Pre-flight checks passed: no active replication slots or flagged extensions.
/// Available actions: `provision()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleared;

/// Blue/green deployment exists for the source resource.
/// Available actions: `status()`, `switchover()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Provisioned;

/// Switchover initiated, awaiting completion.
/// Available actions: `wait_for_switchover()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchingOver;

/// Switchover completed: the green environment is now primary.
/// Available actions: `cleanup()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchedOver;

/// Terminal state: wrapper and superseded resources deleted.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;
