//! Compiled-in default configuration.
//!
//! A fresh install (or a config too old to migrate) starts from this data:
//! nine entity groups, one rule set named `default` expressing standard
//! PvE behavior, and its self-mapping.

use pax_core::{EntityGroup, FlagSet, RuleFlag, RuleSet};

use crate::data::PolicyData;

/// Version stamped into freshly written configurations.
pub const CONFIG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A complete default configuration, initialized and ready to serve.
pub fn default_data() -> PolicyData {
    let mut data = PolicyData {
        config_version: CONFIG_VERSION.to_string(),
        ..PolicyData::default()
    };
    data.ensure_option_defaults();
    apply_default_policy(&mut data);
    data.init();
    data
}

/// Resets the policy portion (groups, rule sets, mappings, schedule, and
/// the default rule-set name) to compiled-in defaults. Options and the
/// version stamp are left alone.
pub fn apply_default_policy(data: &mut PolicyData) {
    data.mappings.clear();
    data.rulesets.clear();
    data.groups.clear();
    data.schedule = Default::default();
    data.default_ruleset = "default".to_string();

    data.groups = vec![
        group("dispensers", &["corpse", "heli_debris"]),
        group("players", &["player"]),
        group(
            "traps",
            &[
                "auto_turret",
                "bear_trap",
                "flame_turret",
                "landmine",
                "gun_trap",
                "reactive_target",
                "spikes.floor",
            ],
        ),
        group("barricades", &["barricade"]),
        group(
            "highwalls",
            &[
                "wall.external.high.stone",
                "wall.external.high.wood",
                "gates.external.high.wood",
            ],
        ),
        group("heli", &["patrol_helicopter"]),
        group("npcs", &["npc_player", "apc"]),
        group("fire", &["fireball"]),
        group("resources", &["resource_node", "tree", "ore_node"]),
    ];

    let mut default_set = RuleSet::new("default");
    default_set.flags = FlagSet::from_iter([
        RuleFlag::HumanNpcDamage,
        RuleFlag::LockedStorageImmortal,
        RuleFlag::LockedDoorsImmortal,
    ]);
    for sentence in [
        "anything can hurt dispensers",
        "anything can hurt players",
        "players cannot hurt players",
        "anything can hurt traps",
        "traps cannot hurt players",
        "players can hurt barricades",
        "barricades cannot hurt players",
        "highwalls cannot hurt players",
        "anything can hurt heli",
        "anything can hurt npcs",
        "fire cannot hurt players",
        "anything can hurt resources",
    ] {
        default_set.add_rule(sentence);
    }
    data.rulesets.push(default_set);

    data.mappings
        .insert("default".to_string(), "default".to_string());
}

fn group(name: &str, members: &[&str]) -> EntityGroup {
    let mut g = EntityGroup::new(name);
    for member in members {
        g.add_member(*member);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_core::{EntityId, EntityKind, EntitySnapshot};

    #[test]
    fn test_default_data_is_coherent() {
        let data = default_data();
        assert_eq!(data.groups.len(), 9);
        assert_eq!(data.rulesets.len(), 1);
        assert_eq!(data.mappings.get("default").map(String::as_str), Some("default"));
        assert!(data.default_ruleset().is_some());
        assert!(data.rulesets[0].invalid_rules().is_empty());
    }

    #[test]
    fn test_default_rules_deny_pvp() {
        let data = default_data();
        let rs = data.default_ruleset().unwrap();
        assert_eq!(rs.lookup("players", "players"), Some(false));
        assert_eq!(rs.lookup("any", "players"), Some(true));
    }

    #[test]
    fn test_default_flags() {
        let data = default_data();
        let rs = data.default_ruleset().unwrap();
        assert!(rs.has_flag(RuleFlag::HumanNpcDamage));
        assert!(rs.has_flag(RuleFlag::LockedStorageImmortal));
        assert!(rs.has_flag(RuleFlag::LockedDoorsImmortal));
        assert!(!rs.has_flag(RuleFlag::SelfDamage));
    }

    #[test]
    fn test_default_groups_classify_snapshots() {
        let data = default_data();
        let turret = EntitySnapshot::new(EntityId::from(10), "auto_turret", EntityKind::Sentry);
        let names: Vec<&str> = data
            .groups
            .iter()
            .filter(|g| g.contains(&turret))
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["traps"]);
    }

    #[test]
    fn test_default_data_round_trips_as_json() {
        let data = default_data();
        let json = serde_json::to_string_pretty(&data).unwrap();
        let mut back: PolicyData = serde_json::from_str(&json).unwrap();
        back.init();
        assert_eq!(back.groups.len(), data.groups.len());
        assert_eq!(
            back.default_ruleset().unwrap().lookup("players", "players"),
            Some(false)
        );
    }
}
