// ABOUTME: Secret retrieval trait and the connection secret record shape.
// ABOUTME: Host and password are mandatory; everything else has defaults.

use async_trait::async_trait;
use serde::Deserialize;

use super::sealed::Sealed;

/// Read access to stored database connection secrets.
#[async_trait]
pub trait SecretOps: Sealed + Send + Sync {
    /// Fetch and parse the connection secret stored under `secret_id`.
    async fn connection_secret(&self, secret_id: &str) -> Result<DbSecret, SecretError>;
}

/// Database connection details as stored in the secret record.
#[derive(Debug, Clone)]
pub struct DbSecret {
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub username: String,
    pub password: String,
}

impl DbSecret {
    /// Parse the JSON secret string, applying defaults for optional fields.
    /// Missing `host` or `password` is a hard failure.
    pub fn from_json(raw: &str) -> Result<Self, SecretError> {
        let record: SecretRecord =
            serde_json::from_str(raw).map_err(|e| SecretError::Malformed(e.to_string()))?;

        let host = record
            .host
            .filter(|h| !h.is_empty())
            .ok_or(SecretError::MissingField("host"))?;
        let password = record
            .password
            .filter(|p| !p.is_empty())
            .ok_or(SecretError::MissingField("password"))?;

        Ok(Self {
            host,
            port: record.port,
            database_name: record.database_name,
            username: record.username,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SecretRecord {
    host: Option<String>,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(rename = "databaseName", default = "default_database")]
    database_name: String,
    #[serde(default = "default_username")]
    username: String,
    password: Option<String>,
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

/// Errors from secret retrieval and parsing.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("secret '{0}' has no string payload")]
    NoStringPayload(String),

    #[error("malformed secret record: {0}")]
    Malformed(String),

    #[error("missing {0} in the secret record")]
    MissingField(&'static str),

    #[error("provider error: {0}")]
    Api(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let secret = DbSecret::from_json(
            r#"{"host":"db.example.com","port":5433,"databaseName":"orders","username":"admin","password":"s3cret"}"#,
        )
        .unwrap();
        assert_eq!(secret.host, "db.example.com");
        assert_eq!(secret.port, 5433);
        assert_eq!(secret.database_name, "orders");
        assert_eq!(secret.username, "admin");
        assert_eq!(secret.password, "s3cret");
    }

    #[test]
    fn applies_defaults() {
        let secret =
            DbSecret::from_json(r#"{"host":"db.example.com","password":"s3cret"}"#).unwrap();
        assert_eq!(secret.port, 5432);
        assert_eq!(secret.database_name, "postgres");
        assert_eq!(secret.username, "root");
    }

    #[test]
    fn missing_host_or_password_is_fatal() {
        assert!(matches!(
            DbSecret::from_json(r#"{"password":"s3cret"}"#),
            Err(SecretError::MissingField("host"))
        ));
        assert!(matches!(
            DbSecret::from_json(r#"{"host":"db.example.com"}"#),
            Err(SecretError::MissingField("password"))
        ));
    }
}
