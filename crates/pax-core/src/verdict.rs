//! # Verdict — Three-Valued Decision Result
//!
//! Defines [`Verdict`], the result type every decision chain in the engine
//! produces. A decision is `Allow`, `Deny`, or `NoOpinion`; there is no
//! nullable-boolean anywhere in the public contract.
//!
//! ## Design
//!
//! The three values have distinct meanings for the caller:
//!
//! - `Allow` / `Deny` are definite answers. The caller applies or cancels
//!   the interaction and stops consulting other authorities.
//! - `NoOpinion` defers: the engine either is disabled or has no policy
//!   covering the interaction, and the caller's own default applies.
//!
//! External collaborators answer through the same type, so a malformed
//! override response is unrepresentable by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decision result for a single interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The interaction is permitted.
    Allow,
    /// The interaction is blocked.
    Deny,
    /// The engine takes no position; the caller's default governs.
    NoOpinion,
}

impl Verdict {
    /// Definite verdict from a permit boolean.
    pub fn from_allow(allow: bool) -> Self {
        if allow {
            Self::Allow
        } else {
            Self::Deny
        }
    }

    /// True for `Allow` and `Deny`, false for `NoOpinion`.
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::NoOpinion)
    }

    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_deny(self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Stable lowercase name, used in logs and trace output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::NoOpinion => "no_opinion",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_allow() {
        assert_eq!(Verdict::from_allow(true), Verdict::Allow);
        assert_eq!(Verdict::from_allow(false), Verdict::Deny);
    }

    #[test]
    fn test_decidedness() {
        assert!(Verdict::Allow.is_decided());
        assert!(Verdict::Deny.is_decided());
        assert!(!Verdict::NoOpinion.is_decided());
    }

    #[test]
    fn test_accessors() {
        assert!(Verdict::Allow.is_allow());
        assert!(!Verdict::Allow.is_deny());
        assert!(Verdict::Deny.is_deny());
        assert!(!Verdict::NoOpinion.is_allow());
        assert!(!Verdict::NoOpinion.is_deny());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::NoOpinion).unwrap(),
            "\"no_opinion\""
        );
        let v: Verdict = serde_json::from_str("\"deny\"").unwrap();
        assert_eq!(v, Verdict::Deny);
    }

    #[test]
    fn test_display_matches_as_str() {
        for v in [Verdict::Allow, Verdict::Deny, Verdict::NoOpinion] {
            assert_eq!(format!("{v}"), v.as_str());
        }
    }
}
