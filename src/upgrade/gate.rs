// ABOUTME: Version gate deciding whether an upgrade is required.
// ABOUTME: Pure value comparison; no provider calls are made here.

use crate::types::EngineVersion;

/// Outcome of comparing the running version against the requested target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeDecision {
    /// Versions match; nothing to do.
    NotNeeded,
    /// Current version is older than the target; proceed.
    Required,
    /// Current version is newer than the target; refuse.
    Downgrade,
}

/// Compare current and target versions. Equal versions short-circuit the
/// whole run; a newer current version is an unsupported downgrade.
pub fn evaluate(current: &EngineVersion, target: &EngineVersion) -> UpgradeDecision {
    if current == target {
        UpgradeDecision::NotNeeded
    } else if current < target {
        UpgradeDecision::Required
    } else {
        UpgradeDecision::Downgrade
    }
}
