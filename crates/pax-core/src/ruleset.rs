//! # Rule Sets — Flags, Rules, and Precedence
//!
//! A [`RuleSet`] bundles a flag set with authored rule sentences and
//! evaluates group pairs with strict precedence: direct `source->target`
//! rules first, then `source->any`, then `any->target`, and finally the
//! set's default permission. The first matching tier wins.
//!
//! Raw sentences are the persisted form; [`RuleSet::build`] translates them
//! once. Duplicate keys collapse to the first-built rule, and invalid
//! sentences are kept for diagnostics but never consulted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flags::{FlagSet, RuleFlag};
use crate::rule::{Rule, ANY};

/// A named, independently toggleable rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Permission when no rule matches.
    #[serde(default)]
    pub default_allow: bool,
    #[serde(default)]
    pub flags: FlagSet,
    /// Authored rule sentences; the persisted form.
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(skip)]
    parsed: HashMap<String, Rule>,
    #[serde(skip)]
    invalid: Vec<Rule>,
}

fn default_enabled() -> bool {
    true
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            default_allow: false,
            flags: FlagSet::new(),
            rules: Vec::new(),
            parsed: HashMap::new(),
            invalid: Vec::new(),
        }
    }

    /// Translates every sentence. Must run after deserialization and after
    /// any direct mutation of `rules`; [`RuleSet::add_rule`] keeps the
    /// parsed form current on its own.
    pub fn build(&mut self) {
        self.parsed.clear();
        self.invalid.clear();
        let sentences = self.rules.clone();
        for text in &sentences {
            self.index(Rule::parse(text));
        }
    }

    /// Adds a sentence and indexes it immediately.
    pub fn add_rule(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.index(Rule::parse(&text));
        self.rules.push(text);
    }

    fn index(&mut self, rule: Rule) {
        if rule.valid {
            self.parsed.entry(rule.key.clone()).or_insert(rule);
        } else {
            self.invalid.push(rule);
        }
    }

    /// Sentences that failed translation, for warning at load time.
    pub fn invalid_rules(&self) -> &[Rule] {
        &self.invalid
    }

    pub fn has_flag(&self, flag: RuleFlag) -> bool {
        self.flags.contains(flag)
    }

    /// No authored rules and no flags. Empty rule sets are always-allow
    /// passthroughs at the mapping layer.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.flags.is_empty()
    }

    /// Direct key lookup among valid rules.
    pub fn lookup(&self, source: &str, target: &str) -> Option<bool> {
        self.parsed
            .get(&Rule::key_for(source, target))
            .map(|r| r.allow)
    }

    /// Walks the precedence tiers for the group memberships of both
    /// parties and reports which tier decided.
    pub fn decide(&self, source_groups: &[String], target_groups: &[String]) -> RuleMatch {
        if self.parsed.is_empty() {
            return RuleMatch::Default(self.default_allow);
        }

        for src in source_groups {
            for dst in target_groups {
                if let Some(allow) = self.lookup(src, dst) {
                    return RuleMatch::Direct {
                        key: Rule::key_for(src, dst),
                        allow,
                    };
                }
            }
        }
        for src in source_groups {
            if let Some(allow) = self.lookup(src, ANY) {
                return RuleMatch::SourceAny {
                    key: Rule::key_for(src, ANY),
                    allow,
                };
            }
        }
        for dst in target_groups {
            if let Some(allow) = self.lookup(ANY, dst) {
                return RuleMatch::TargetAny {
                    key: Rule::key_for(ANY, dst),
                    allow,
                };
            }
        }
        RuleMatch::Default(self.default_allow)
    }

    /// Final permission for the group pair.
    pub fn evaluate(&self, source_groups: &[String], target_groups: &[String]) -> bool {
        self.decide(source_groups, target_groups).allow()
    }
}

/// Outcome of a precedence walk, carrying the deciding tier for tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    /// A direct `source->target` rule matched.
    Direct { key: String, allow: bool },
    /// A `source->any` wildcard matched.
    SourceAny { key: String, allow: bool },
    /// An `any->target` wildcard matched.
    TargetAny { key: String, allow: bool },
    /// No rule matched; the set's default applied.
    Default(bool),
}

impl RuleMatch {
    pub fn allow(&self) -> bool {
        match self {
            Self::Direct { allow, .. }
            | Self::SourceAny { allow, .. }
            | Self::TargetAny { allow, .. } => *allow,
            Self::Default(allow) => *allow,
        }
    }
}

impl fmt::Display for RuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = |allow: bool| if allow { "allow" } else { "deny" };
        match self {
            Self::Direct { key, allow } => write!(f, "direct rule {key}: {}", verdict(*allow)),
            Self::SourceAny { key, allow } => {
                write!(f, "source wildcard {key}: {}", verdict(*allow))
            }
            Self::TargetAny { key, allow } => {
                write!(f, "target wildcard {key}: {}", verdict(*allow))
            }
            Self::Default(allow) => write!(f, "no rule matched, default: {}", verdict(*allow)),
        }
    }
}
