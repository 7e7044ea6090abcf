// ABOUTME: Validated RDS/Aurora resource identifier.
// ABOUTME: Enforces the provider naming rules before any API call is made.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbIdentifierError {
    #[error("identifier cannot be empty")]
    Empty,

    #[error("identifier exceeds maximum length of 63 characters")]
    TooLong,

    #[error("identifier must begin with a letter")]
    MustStartWithLetter,

    #[error("identifier cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("identifier cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("invalid character in identifier: '{0}'")]
    InvalidChar(char),
}

/// An RDS instance or Aurora cluster identifier.
///
/// 1-63 ASCII letters, digits, or hyphens; must begin with a letter;
/// cannot end with a hyphen or contain two consecutive hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbIdentifier(String);

impl DbIdentifier {
    pub fn new(value: &str) -> Result<Self, DbIdentifierError> {
        if value.is_empty() {
            return Err(DbIdentifierError::Empty);
        }

        if value.len() > 63 {
            return Err(DbIdentifierError::TooLong);
        }

        let first = value.chars().next().unwrap_or_default();
        if !first.is_ascii_alphabetic() {
            return Err(DbIdentifierError::MustStartWithLetter);
        }

        if value.ends_with('-') {
            return Err(DbIdentifierError::EndsWithHyphen);
        }

        if value.contains("--") {
            return Err(DbIdentifierError::ConsecutiveHyphens);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' {
                return Err(DbIdentifierError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DbIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_identifiers() {
        assert!(DbIdentifier::new("mydbinstance").is_ok());
        assert!(DbIdentifier::new("orders-prod-2").is_ok());
    }

    #[test]
    fn rejects_invalid_identifiers() {
        assert!(matches!(
            DbIdentifier::new(""),
            Err(DbIdentifierError::Empty)
        ));
        assert!(matches!(
            DbIdentifier::new("1db"),
            Err(DbIdentifierError::MustStartWithLetter)
        ));
        assert!(matches!(
            DbIdentifier::new("db-"),
            Err(DbIdentifierError::EndsWithHyphen)
        ));
        assert!(matches!(
            DbIdentifier::new("db--prod"),
            Err(DbIdentifierError::ConsecutiveHyphens)
        ));
        assert!(matches!(
            DbIdentifier::new("db_prod"),
            Err(DbIdentifierError::InvalidChar('_'))
        ));
        assert!(matches!(
            DbIdentifier::new(&"a".repeat(64)),
            Err(DbIdentifierError::TooLong)
        ));
    }
}
