// ABOUTME: Provider abstraction: capability traits plus the AWS implementation.
// ABOUTME: The orchestrator only ever sees the traits; tests substitute mocks.

mod aws;
mod error;
mod traits;

pub(crate) use traits::sealed;

pub use aws::AwsProvider;
pub use error::{ProviderError, ProviderErrorKind};
pub use traits::*;
