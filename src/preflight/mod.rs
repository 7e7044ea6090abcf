// ABOUTME: Pre-flight checks run against the live database before provisioning.
// ABOUTME: Active replication slots or flagged extensions block the upgrade.

use std::time::Duration;

use tokio_postgres::NoTls;
use tracing::{info, warn};

use crate::provider::{DbSecret, SecretError, SecretOps};
use crate::types::DbIdentifier;

/// Extensions that interfere with a blue/green upgrade, with the reason
/// each one blocks.
pub const FLAGGED_EXTENSIONS: [(&str, &str); 5] = [
    ("pg_partman", "Should be disabled in blue environments."),
    ("pg_cron", "Should remain disabled in green environments."),
    ("pglogical", "Should be disabled in blue environments."),
    ("pgactive", "Should be disabled in blue environments."),
    ("pgaudit", "Must remain in shared_preload_libraries."),
];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Secret path convention for a resource's root connection credentials.
pub fn secret_id_for(identifier: &DbIdentifier) -> String {
    format!("rds/{identifier}/root")
}

/// What pre-flight observed on the live database.
#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    /// Names of replication slots currently marked active.
    pub active_slots: Vec<String>,
    /// Installed extensions from the flagged list, with their reasons.
    pub flagged: Vec<FlaggedExtension>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedExtension {
    pub name: String,
    pub reason: &'static str,
}

impl PreflightReport {
    /// A report with nothing observed; never blocks.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Cross installed extensions against the flagged list and keep the
    /// active slots as observed.
    pub fn from_observations(active_slots: Vec<String>, extensions: &[String]) -> Self {
        let flagged = extensions
            .iter()
            .filter_map(|ext| {
                FLAGGED_EXTENSIONS
                    .iter()
                    .find(|(name, _)| name == ext)
                    .map(|(name, reason)| FlaggedExtension {
                        name: (*name).to_string(),
                        reason,
                    })
            })
            .collect();
        Self {
            active_slots,
            flagged,
        }
    }

    /// Any active slot or flagged extension blocks the upgrade.
    pub fn blocked(&self) -> bool {
        !self.active_slots.is_empty() || !self.flagged.is_empty()
    }

    /// One-line human summary of everything that blocks.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.active_slots.is_empty() {
            parts.push(format!(
                "active replication slots: {}",
                self.active_slots.join(", ")
            ));
        }
        for ext in &self.flagged {
            parts.push(format!("extension {} installed ({})", ext.name, ext.reason));
        }
        parts.join("; ")
    }
}

/// Errors from the pre-flight connectivity check.
#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}

/// Run the pre-flight checks: fetch the connection secret, connect, and
/// query replication slots and installed extensions.
pub async fn run<P: SecretOps>(
    provider: &P,
    identifier: &DbIdentifier,
) -> Result<PreflightReport, PreflightError> {
    let secret_id = secret_id_for(identifier);
    let secret = provider.connection_secret(&secret_id).await?;

    let report = inspect(&secret).await?;
    if report.blocked() {
        warn!(summary = %report.summary(), "pre-flight found blockers");
    } else {
        info!("pre-flight clean");
    }
    Ok(report)
}

async fn inspect(secret: &DbSecret) -> Result<PreflightReport, PreflightError> {
    let config = format!(
        "host={} port={} dbname={} user={}",
        secret.host, secret.port, secret.database_name, secret.username
    );
    let mut pg_config: tokio_postgres::Config = config
        .parse()
        .map_err(PreflightError::Database)?;
    pg_config.password(&secret.password);

    let (client, connection) = tokio::time::timeout(CONNECT_TIMEOUT, pg_config.connect(NoTls))
        .await
        .map_err(|_| PreflightError::ConnectTimeout(secret.host.clone()))??;

    // The connection drives the socket; it resolves when the client drops.
    let driver = tokio::spawn(connection);

    let slot_rows = client
        .query(
            "SELECT slot_name FROM pg_replication_slots WHERE active = true",
            &[],
        )
        .await?;
    let active_slots = slot_rows.iter().map(|row| row.get(0)).collect();

    let ext_rows = client.query("SELECT extname FROM pg_extension", &[]).await?;
    let extensions: Vec<String> = ext_rows.iter().map(|row| row.get(0)).collect();

    drop(client);
    driver.abort();

    Ok(PreflightReport::from_observations(active_slots, &extensions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_path_follows_convention() {
        let id = DbIdentifier::new("orders-prod").unwrap();
        assert_eq!(secret_id_for(&id), "rds/orders-prod/root");
    }

    #[test]
    fn clean_report_never_blocks() {
        assert!(!PreflightReport::clean().blocked());
        assert_eq!(PreflightReport::clean().summary(), "");
    }

    #[test]
    fn active_slots_block() {
        let report = PreflightReport::from_observations(vec!["slot_a".to_string()], &[]);
        assert!(report.blocked());
        assert!(report.summary().contains("slot_a"));
    }

    #[test]
    fn only_flagged_extensions_block() {
        let installed = vec![
            "plpgsql".to_string(),
            "pg_cron".to_string(),
            "uuid-ossp".to_string(),
        ];
        let report = PreflightReport::from_observations(Vec::new(), &installed);
        assert!(report.blocked());
        assert_eq!(report.flagged.len(), 1);
        assert_eq!(report.flagged[0].name, "pg_cron");
        assert!(report.summary().contains("green environments"));
    }

    #[test]
    fn benign_extensions_pass() {
        let installed = vec!["plpgsql".to_string(), "postgis".to_string()];
        let report = PreflightReport::from_observations(Vec::new(), &installed);
        assert!(!report.blocked());
    }

    #[test]
    fn every_flagged_extension_is_reported() {
        let installed: Vec<String> = FLAGGED_EXTENSIONS
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect();
        let report = PreflightReport::from_observations(Vec::new(), &installed);
        assert_eq!(report.flagged.len(), FLAGGED_EXTENSIONS.len());
    }
}
