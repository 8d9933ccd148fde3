use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// The statement family a run generates a parser for (e.g. `icici`, `sbi`).
///
/// Normalized once at construction: surrounding whitespace trimmed and
/// lower-cased, so `ICICI` and ` icici ` name the same artifact. Only ASCII
/// letters, digits, `_` and `-` are accepted, which keeps the artifact key
/// inside the artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn parse(raw: &str) -> Result<Self, AgentError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AgentError::InvalidTarget {
                target: raw.to_string(),
                reason: "target must not be empty".into(),
            });
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(AgentError::InvalidTarget {
                target: raw.to_string(),
                reason: format!("unsupported character {bad:?}"),
            });
        }
        Ok(Self(normalized))
    }

    /// File name of the generated parser module for this target.
    pub fn artifact_file_name(&self) -> String {
        format!("{}_parser.py", self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let a = Target::parse("ICICI").unwrap();
        let b = Target::parse("  icici\n").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "icici");
        assert_eq!(a.artifact_file_name(), "icici_parser.py");
    }

    #[test]
    fn rejects_empty_target() {
        assert!(matches!(
            Target::parse("   "),
            Err(AgentError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn rejects_path_like_targets() {
        for raw in ["../etc", "a/b", "a b", "sbi.py"] {
            assert!(Target::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn accepts_dashes_and_underscores() {
        assert_eq!(Target::parse("hdfc_cc-v2").unwrap().to_string(), "hdfc_cc-v2");
    }
}
