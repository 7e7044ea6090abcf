// ABOUTME: Engine version parsing and ordering with numeric dotted-version semantics.
// ABOUTME: Non-numeric versions sort after every numeric version.

use std::cmp::Ordering;
use std::fmt;

/// A database engine version parsed from a dotted version string.
///
/// Comparison is lexicographic over the numeric components, with missing
/// trailing components treated as zero, so `15` equals `15.0` and
/// `15.8` sorts below `15.10`. A version with any non-numeric component
/// sorts after every fully-numeric version.
#[derive(Debug, Clone)]
pub struct EngineVersion {
    raw: String,
    parts: Option<Vec<u64>>,
}

impl EngineVersion {
    /// Parse a version string. Never fails: unparseable input becomes a
    /// sentinel that compares greater than any numeric version.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parts = trimmed
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>();
        Self {
            raw: trimmed.to_string(),
            parts,
        }
    }

    /// The original version string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether every component parsed as a non-negative integer.
    pub fn is_numeric(&self) -> bool {
        self.parts.is_some()
    }

    /// The leading (major) component, if numeric.
    pub fn major(&self) -> Option<u64> {
        self.parts.as_ref().and_then(|p| p.first().copied())
    }
}

impl PartialEq for EngineVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EngineVersion {}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parts, &other.parts) {
            (Some(a), Some(b)) => {
                let width = a.len().max(b.len());
                for i in 0..width {
                    let left = a.get(i).copied().unwrap_or(0);
                    let right = b.get(i).copied().unwrap_or(0);
                    match left.cmp(&right) {
                        Ordering::Equal => continue,
                        unequal => return unequal,
                    }
                }
                Ordering::Equal
            }
            // The sentinel sorts after every numeric version.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_order_not_string_order() {
        assert!(EngineVersion::parse("15.8") < EngineVersion::parse("15.10"));
        assert!(EngineVersion::parse("15.8") > EngineVersion::parse("15.1"));
    }

    #[test]
    fn missing_trailing_components_are_zero() {
        assert_eq!(EngineVersion::parse("15"), EngineVersion::parse("15.0"));
        assert_eq!(
            EngineVersion::parse("13.4"),
            EngineVersion::parse("13.4.0.0")
        );
    }

    #[test]
    fn non_numeric_sorts_after_any_numeric() {
        let weird = EngineVersion::parse("abc");
        assert!(!weird.is_numeric());
        assert!(weird > EngineVersion::parse("99.99"));
        assert_eq!(weird, EngineVersion::parse("xyz"));
    }

    #[test]
    fn major_component() {
        assert_eq!(EngineVersion::parse("13.4").major(), Some(13));
        assert_eq!(EngineVersion::parse("abc").major(), None);
    }

    #[test]
    fn display_preserves_input() {
        assert_eq!(EngineVersion::parse(" 15.8 ").to_string(), "15.8");
    }
}
