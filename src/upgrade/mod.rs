// ABOUTME: Upgrade orchestration built on the type state pattern.
// ABOUTME: Gate, pre-flight clearance, provisioning, switchover, and cleanup.

use std::time::Duration;

mod error;
mod gate;
mod state;
mod target;
mod transitions;

pub use error::UpgradeError;
pub use gate::{evaluate, UpgradeDecision};
pub use state::{Cleared, Completed, Provisioned, SwitchedOver, SwitchingOver, Validated};
pub use target::UpgradeTarget;
pub use transitions::{TransitionResult, Upgrade};

/// Total budget for the switchover polling loop.
pub const SWITCHOVER_WAIT: Duration = Duration::from_secs(300);

/// Interval between switchover status checks.
pub const SWITCHOVER_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Provider-side timeout passed with the switchover call, in seconds.
pub(crate) const SWITCHOVER_CALL_TIMEOUT_SECS: i32 = 300;

/// How long to wait for a modified resource to settle back to available.
pub(crate) const AVAILABILITY_WAIT: Duration = Duration::from_secs(1800);

/// How long to wait for the pre-upgrade snapshot to become available.
pub(crate) const SNAPSHOT_WAIT: Duration = Duration::from_secs(1800);
