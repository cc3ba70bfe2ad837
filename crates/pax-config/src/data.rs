//! # Policy Data — The Persisted Configuration Schema
//!
//! [`PolicyData`] is the whole engine configuration as one JSON document:
//! global options, the location-to-rule-set mapping table, a rotation
//! schedule, the rule sets themselves, and the entity groups they refer to.
//!
//! ## Reserved names
//!
//! Two mapping strings are reserved: the key [`ALL_ZONES`] maps *every*
//! location that has no mapping of its own, and the target [`EXCLUDE`]
//! marks a location as outside the engine's jurisdiction entirely (the
//! engine offers no opinion there).
//!
//! ## Mutation discipline
//!
//! All mutations validate before touching state and report what changed,
//! so callers can persist on success and relay precise feedback. Rule-set
//! and schedule rebuilds happen in [`PolicyData::init`], which is
//! re-invoked after any mutation that alters parse inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use pax_core::{EntityGroup, RuleSet, Schedule};

use crate::error::{ConfigError, ConfigResult};

/// Mapping key matching every location without a mapping of its own.
pub const ALL_ZONES: &str = "allzones";

/// Mapping target placing a location outside the engine's jurisdiction.
pub const EXCLUDE: &str = "exclude";

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Global engine toggles. Both default to enabled when absent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EngineOption {
    /// Adjudicate damage at all. Off means the engine offers no opinion.
    HandleDamage,
    /// Consult the zone provider when resolving rule sets.
    UseZones,
}

impl EngineOption {
    pub const ALL: [EngineOption; 2] = [EngineOption::HandleDamage, EngineOption::UseZones];
}

// ---------------------------------------------------------------------------
// Mutation outcomes
// ---------------------------------------------------------------------------

/// What a mapping upsert did, for operator feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingChange {
    Created,
    Updated { previous: String },
}

// ---------------------------------------------------------------------------
// PolicyData
// ---------------------------------------------------------------------------

/// The complete persisted configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyData {
    /// Version of the writer, for forward-migration checks.
    #[serde(default)]
    pub config_version: String,
    /// Name of the rule set governing unmapped locations.
    #[serde(default = "default_ruleset_name")]
    pub default_ruleset: String,
    #[serde(default)]
    pub options: BTreeMap<EngineOption, bool>,
    /// Location key (zone id or rule-set self-name) to rule-set name, or
    /// the literal [`EXCLUDE`].
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub rulesets: Vec<RuleSet>,
    #[serde(default)]
    pub groups: Vec<EntityGroup>,
}

fn default_ruleset_name() -> String {
    "default".to_string()
}

impl Default for PolicyData {
    fn default() -> Self {
        Self {
            config_version: String::new(),
            default_ruleset: default_ruleset_name(),
            options: BTreeMap::new(),
            mappings: BTreeMap::new(),
            schedule: Schedule::default(),
            rulesets: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl PolicyData {
    /// Rebuilds every rule set's parsed index and the schedule, warning
    /// about entries that failed translation. Call after deserialization
    /// and after any mutation of rule or schedule text.
    pub fn init(&mut self) {
        for ruleset in &mut self.rulesets {
            ruleset.build();
        }
        for ruleset in &self.rulesets {
            for rule in ruleset.invalid_rules() {
                warn!(
                    ruleset = %ruleset.name,
                    rule = %rule.text,
                    "ignoring unparseable rule"
                );
            }
        }
        self.schedule.init();
        for entry in self.schedule.invalid_entries() {
            warn!(entry = %entry.text, "ignoring unparseable schedule entry");
        }
        if !self.schedule.entries.is_empty() && !self.schedule.is_valid() {
            warn!("schedule needs two or more entries naming two or more rule sets; disabled");
        }
    }

    // ---- queries ----

    /// Whether an option is enabled. Absent options default to enabled.
    pub fn option_enabled(&self, option: EngineOption) -> bool {
        self.options.get(&option).copied().unwrap_or(true)
    }

    /// First rule set carrying this name.
    pub fn find_ruleset(&self, name: &str) -> Option<&RuleSet> {
        self.rulesets.iter().find(|rs| rs.name == name)
    }

    /// The rule set governing unmapped locations. Duplicate names earn a
    /// warning; the first declaration wins.
    pub fn default_ruleset(&self) -> Option<&RuleSet> {
        let count = self
            .rulesets
            .iter()
            .filter(|rs| rs.name == self.default_ruleset)
            .count();
        if count > 1 {
            warn!(
                name = %self.default_ruleset,
                count,
                "multiple rule sets share the default name; using the first"
            );
        }
        self.find_ruleset(&self.default_ruleset)
    }

    /// Whether a location key participates in mapping at all. An
    /// [`ALL_ZONES`] mapping makes every key participate.
    pub fn has_mapping(&self, key: &str) -> bool {
        self.mappings.contains_key(key) || self.mappings.contains_key(ALL_ZONES)
    }

    /// Whether the mapping for this key leads nowhere: an exclusion (on
    /// the key or via [`ALL_ZONES`]), a rule set that does not exist, or
    /// one with no rules and no flags. An unmapped key is *not* empty.
    pub fn has_empty_mapping(&self, key: &str) -> bool {
        if self.mappings.get(ALL_ZONES).map(String::as_str) == Some(EXCLUDE) {
            return true;
        }
        let Some(target) = self.mappings.get(key) else {
            return false;
        };
        if target == EXCLUDE {
            return true;
        }
        match self.find_ruleset(target) {
            Some(ruleset) => ruleset.is_empty(),
            None => true,
        }
    }

    // ---- mutations ----

    /// Creates or replaces the mapping for `key`. The target must name an
    /// existing rule set or be the literal [`EXCLUDE`].
    pub fn add_or_update_mapping(&mut self, key: &str, target: &str) -> ConfigResult<MappingChange> {
        if target != EXCLUDE && self.find_ruleset(target).is_none() {
            return Err(ConfigError::UnknownTarget {
                target: target.to_string(),
            });
        }
        match self.mappings.insert(key.to_string(), target.to_string()) {
            Some(previous) => Ok(MappingChange::Updated { previous }),
            None => Ok(MappingChange::Created),
        }
    }

    /// Removes the mapping for `key`, returning its previous target.
    pub fn remove_mapping(&mut self, key: &str) -> ConfigResult<String> {
        self.mappings
            .remove(key)
            .ok_or_else(|| ConfigError::UnknownMapping {
                key: key.to_string(),
            })
    }

    /// Toggles the schedule. Rejected in either direction while the
    /// schedule is invalid, since an invalid schedule is forced off.
    pub fn set_schedule_enabled(&mut self, enabled: bool) -> ConfigResult<()> {
        if !self.schedule.is_valid() {
            return Err(ConfigError::InvalidSchedule);
        }
        self.schedule.enabled = enabled;
        Ok(())
    }

    /// Swaps the default rule-set name. The name must resolve, so the
    /// previous default stays in place on failure.
    pub fn set_default_ruleset(&mut self, name: &str) -> ConfigResult<()> {
        if self.find_ruleset(name).is_none() {
            return Err(ConfigError::UnknownRuleSet {
                name: name.to_string(),
            });
        }
        self.default_ruleset = name.to_string();
        Ok(())
    }

    // ---- self-repair (store hygiene) ----

    /// Fills in absent options as enabled. Returns whether anything changed.
    pub fn ensure_option_defaults(&mut self) -> bool {
        let mut dirty = false;
        for option in EngineOption::ALL {
            if !self.options.contains_key(&option) {
                self.options.insert(option, true);
                dirty = true;
            }
        }
        dirty
    }

    /// Guarantees every rule set is reachable: any rule set whose name is
    /// not the target of some mapping gets a self-mapping.
    pub fn ensure_self_mappings(&mut self) -> bool {
        let missing: Vec<String> = self
            .rulesets
            .iter()
            .map(|rs| rs.name.clone())
            .filter(|name| !self.mappings.values().any(|target| target == name))
            .collect();
        let dirty = !missing.is_empty();
        for name in missing {
            self.mappings.insert(name.clone(), name);
        }
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_core::FlagSet;

    fn data_with_rulesets(names: &[&str]) -> PolicyData {
        let mut data = PolicyData::default();
        for name in names {
            data.rulesets.push(RuleSet::new(*name));
        }
        data
    }

    // ---- mappings ----

    #[test]
    fn test_add_mapping_requires_known_target() {
        let mut data = data_with_rulesets(&["default"]);
        let err = data.add_or_update_mapping("arena", "missing").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget { .. }));
        assert!(data.mappings.is_empty());
    }

    #[test]
    fn test_add_mapping_accepts_exclude_literal() {
        let mut data = data_with_rulesets(&["default"]);
        let change = data.add_or_update_mapping("arena", EXCLUDE).unwrap();
        assert_eq!(change, MappingChange::Created);
        assert_eq!(data.mappings["arena"], EXCLUDE);
    }

    #[test]
    fn test_update_mapping_reports_previous() {
        let mut data = data_with_rulesets(&["default", "raid"]);
        data.add_or_update_mapping("arena", "default").unwrap();
        let change = data.add_or_update_mapping("arena", "raid").unwrap();
        assert_eq!(
            change,
            MappingChange::Updated {
                previous: "default".to_string()
            }
        );
    }

    #[test]
    fn test_remove_missing_mapping_errors() {
        let mut data = data_with_rulesets(&["default"]);
        assert!(matches!(
            data.remove_mapping("arena"),
            Err(ConfigError::UnknownMapping { .. })
        ));
    }

    #[test]
    fn test_has_mapping_sees_allzones() {
        let mut data = data_with_rulesets(&["default"]);
        assert!(!data.has_mapping("arena"));
        data.add_or_update_mapping(ALL_ZONES, "default").unwrap();
        assert!(data.has_mapping("arena"));
    }

    // ---- empty-mapping classification ----

    #[test]
    fn test_unmapped_key_is_not_empty() {
        let data = data_with_rulesets(&["default"]);
        assert!(!data.has_empty_mapping("arena"));
    }

    #[test]
    fn test_excluded_key_is_empty() {
        let mut data = data_with_rulesets(&["default"]);
        data.add_or_update_mapping("arena", EXCLUDE).unwrap();
        assert!(data.has_empty_mapping("arena"));
    }

    #[test]
    fn test_allzones_exclusion_empties_every_key() {
        let mut data = data_with_rulesets(&["default"]);
        data.add_or_update_mapping(ALL_ZONES, EXCLUDE).unwrap();
        assert!(data.has_empty_mapping("anything"));
    }

    #[test]
    fn test_mapping_to_vanished_ruleset_is_empty() {
        let mut data = data_with_rulesets(&["default", "raid"]);
        data.add_or_update_mapping("arena", "raid").unwrap();
        data.rulesets.retain(|rs| rs.name != "raid");
        assert!(data.has_empty_mapping("arena"));
    }

    #[test]
    fn test_mapping_to_bare_ruleset_is_empty() {
        let mut data = data_with_rulesets(&["default", "bare"]);
        data.add_or_update_mapping("arena", "bare").unwrap();
        assert!(data.has_empty_mapping("arena"));

        // A flag with no rules is still an opinion.
        data.rulesets[1].flags = FlagSet::from_iter([pax_core::RuleFlag::SelfDamage]);
        assert!(!data.has_empty_mapping("arena"));
    }

    // ---- default rule set & schedule ----

    #[test]
    fn test_default_ruleset_prefers_first_duplicate() {
        let mut data = data_with_rulesets(&["default", "default"]);
        data.rulesets[0].default_allow = true;
        data.rulesets[1].default_allow = false;
        assert!(data.default_ruleset().unwrap().default_allow);
    }

    #[test]
    fn test_set_default_ruleset_rejects_unknown() {
        let mut data = data_with_rulesets(&["default"]);
        assert!(data.set_default_ruleset("missing").is_err());
        assert_eq!(data.default_ruleset, "default");
        data.rulesets.push(RuleSet::new("raid"));
        data.set_default_ruleset("raid").unwrap();
        assert_eq!(data.default_ruleset, "raid");
    }

    #[test]
    fn test_schedule_toggle_rejected_while_invalid() {
        let mut data = data_with_rulesets(&["default"]);
        data.init();
        assert!(matches!(
            data.set_schedule_enabled(true),
            Err(ConfigError::InvalidSchedule)
        ));

        data.schedule.entries = vec!["08:00 day".to_string(), "20:00 night".to_string()];
        data.init();
        data.set_schedule_enabled(true).unwrap();
        assert!(data.schedule.enabled);
    }

    // ---- self-repair ----

    #[test]
    fn test_ensure_option_defaults_fills_absent_only() {
        let mut data = PolicyData::default();
        data.options.insert(EngineOption::UseZones, false);
        assert!(data.ensure_option_defaults());
        assert!(data.option_enabled(EngineOption::HandleDamage));
        assert!(!data.option_enabled(EngineOption::UseZones));
        assert!(!data.ensure_option_defaults());
    }

    #[test]
    fn test_ensure_self_mappings_respects_existing_targets() {
        let mut data = data_with_rulesets(&["default", "raid"]);
        // "raid" is already a target under a different key.
        data.mappings
            .insert("zone_7".to_string(), "raid".to_string());
        assert!(data.ensure_self_mappings());
        assert_eq!(data.mappings.get("default").map(String::as_str), Some("default"));
        assert!(!data.mappings.contains_key("raid"));
    }

    #[test]
    fn test_init_marks_invalid_rules_without_failing() {
        let mut data = data_with_rulesets(&["default"]);
        data.rulesets[0].rules = vec!["players".to_string(), "players cannot hurt players".to_string()];
        data.init();
        assert_eq!(data.rulesets[0].invalid_rules().len(), 1);
        assert_eq!(data.rulesets[0].lookup("players", "players"), Some(false));
    }
}
