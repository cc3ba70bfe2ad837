//! # Permission Rules — Sentence Grammar
//!
//! Rules are authored as plain sentences: `"players cannot hurt players"`,
//! `"anything can hurt barricades"`. [`Rule::parse`] translates a sentence
//! into a directed permission keyed `source->target`.
//!
//! ## Grammar
//!
//! Tokens are whitespace-separated. The first token is the source group,
//! the last token is the target group, and everything between is free text
//! that only matters for negation:
//!
//! - fewer than three tokens: the rule is invalid (kept for diagnostics,
//!   never evaluated);
//! - an interior token `cannot` or `can't` makes the rule a denial;
//! - the synonyms `anything`, `all`, `everything`, `any`, `nothing`, `none`
//!   normalize an endpoint to the wildcard group [`ANY`];
//! - `nothing` or `none` at either endpoint additionally inverts the
//!   polarity, so `"nothing can hurt players"` denies and
//!   `"nothing cannot hurt players"` allows. The inversion applies once
//!   even when both endpoints are negative; such sentences are
//!   configuration errors either way.
//!
//! Group names are matched exactly as written; the grammar keywords are
//! lowercase.

/// Wildcard group name, the normalized endpoint for the synonyms.
pub const ANY: &str = "any";

const SYNONYMS: [&str; 6] = ["anything", "nothing", "all", "any", "none", "everything"];

fn inverts(token: &str) -> bool {
    token == "nothing" || token == "none"
}

/// One parsed permission rule.
///
/// Invalid rules keep their original text with an empty key and are
/// excluded from evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Original sentence, as authored.
    pub text: String,
    /// `source->target` lookup key; empty when invalid.
    pub key: String,
    /// Permission the rule expresses.
    pub allow: bool,
    pub valid: bool,
}

impl Rule {
    /// Translate a sentence. Never fails; malformed text yields a rule
    /// with `valid == false`.
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 3 {
            return Self {
                text: text.to_string(),
                key: String::new(),
                allow: false,
                valid: false,
            };
        }

        let mut source = tokens[0];
        let mut target = tokens[tokens.len() - 1];
        let interior = &tokens[1..tokens.len() - 1];

        let mut allow = !interior.iter().any(|t| *t == "cannot" || *t == "can't");

        // Negative endpoints flip the polarity before normalization.
        if inverts(source) || inverts(target) {
            allow = !allow;
        }
        if SYNONYMS.contains(&source) {
            source = ANY;
        }
        if SYNONYMS.contains(&target) {
            target = ANY;
        }

        Self {
            text: text.to_string(),
            key: format!("{source}->{target}"),
            allow,
            valid: true,
        }
    }

    /// Builds the lookup key for a source/target pair.
    pub fn key_for(source: &str, target: &str) -> String {
        format!("{source}->{target}")
    }
}
