// ABOUTME: Library root for relevo - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod alarms;
pub mod config;
pub mod error;
pub mod output;
pub mod params;
pub mod preflight;
pub mod prompt;
pub mod provider;
pub mod replication;
pub mod survey;
pub mod types;
pub mod upgrade;
