//! # Zone Resolution — From Location Keys to a Governing Rule Set
//!
//! When both parties of an interaction stand in zones, the mapping table
//! decides which rule set governs. Only locations *shared* by both sides
//! count, and a shared location mapped to nothing usable (an exclusion,
//! or a missing/bare rule set) short-circuits the whole decision as
//! "outside jurisdiction".
//!
//! ## Tie-breaks
//!
//! Shared keys can map to several distinct rule sets. That is an authoring
//! mistake; the engine warns and deterministically picks the first match
//! in rule-set declaration order. When nothing matches, an `allzones`
//! mapping applies, and failing that the active rule set governs, resolved
//! live by name (a vanished name yields an empty rule set so flag checks
//! degrade quietly).

use std::borrow::Cow;

use tracing::warn;

use pax_config::{PolicyData, ALL_ZONES};
use pax_core::{EntitySnapshot, RuleSet};

use crate::trace::{name_list, Tracer};

/// Locations both sides occupy that participate in mapping, in the order
/// of the first list. An `allzones` mapping makes every key participate.
pub fn shared_locations(
    data: &PolicyData,
    victim_keys: &[String],
    attacker_keys: &[String],
) -> Vec<String> {
    victim_keys
        .iter()
        .filter(|key| attacker_keys.contains(key))
        .filter(|key| data.has_mapping(key))
        .cloned()
        .collect()
}

/// Whether any shared location carries an empty mapping, which places the
/// interaction outside the engine's jurisdiction.
pub fn is_excluded(
    data: &PolicyData,
    victim_keys: &[String],
    attacker_keys: &[String],
    tracer: &Tracer,
) -> bool {
    if tracer.is_live() {
        tracer.line(
            2,
            &format!(
                "checking exclusions between [{}] and [{}]",
                name_list(victim_keys),
                name_list(attacker_keys)
            ),
        );
    }
    let shared = shared_locations(data, victim_keys, attacker_keys);
    tracer.line(3, &format!("shared locations: {}", name_list(&shared)));
    for key in &shared {
        if data.has_empty_mapping(key) {
            tracer.line(3, &format!("found exclusion mapping for location: {key}"));
            return true;
        }
    }
    tracer.line(3, "no exclusion mapping matched");
    false
}

/// Picks the rule set governing this pair of location-key lists. Falls
/// back to the active rule set (by name) when zones decide nothing.
pub fn resolve_ruleset<'a>(
    data: &'a PolicyData,
    active_name: &str,
    victim_keys: &[String],
    attacker_keys: &[String],
    tracer: &Tracer,
) -> Cow<'a, RuleSet> {
    if !victim_keys.is_empty() && !attacker_keys.is_empty() {
        if tracer.is_live() {
            tracer.line(
                2,
                &format!(
                    "rule-set lookup for [{}] and [{}]",
                    name_list(victim_keys),
                    name_list(attacker_keys)
                ),
            );
        }
        let shared = shared_locations(data, victim_keys, attacker_keys);
        tracer.line(3, &format!("shared locations: {}", name_list(&shared)));
        if !shared.is_empty() {
            let names: Vec<&String> = shared
                .iter()
                .filter_map(|key| data.mappings.get(key))
                .collect();
            let mut sets: Vec<&RuleSet> = data
                .rulesets
                .iter()
                .filter(|rs| names.iter().any(|name| *name == &rs.name))
                .collect();
            tracer.line(
                3,
                &format!(
                    "found {} mapped names, with {} matching rule sets",
                    names.len(),
                    sets.len()
                ),
            );

            if sets.is_empty() {
                if let Some(rs) = data
                    .mappings
                    .get(ALL_ZONES)
                    .and_then(|target| data.find_ruleset(target))
                {
                    tracer.line(3, "using the allzones mapping");
                    sets.push(rs);
                }
            }

            if sets.len() > 1 {
                let all: Vec<String> = sets.iter().map(|rs| rs.name.clone()).collect();
                warn!(
                    candidates = %all.join(", "),
                    "multiple rule sets govern these locations; using the first"
                );
                tracer.line(3, &format!("multiple rule sets match: {}", all.join(", ")));
            }

            if let Some(first) = sets.first() {
                tracer.line(3, &format!("selected rule set {:?}", first.name));
                return Cow::Borrowed(*first);
            }
        }
    }

    tracer.line(3, &format!("no zone match; using active rule set {active_name:?}"));
    match data.find_ruleset(active_name) {
        Some(rs) => Cow::Borrowed(rs),
        None => Cow::Owned(RuleSet::new(active_name)),
    }
}

/// Whether any group lists this attacker's prefab or type tag among its
/// exclusions (case-insensitive). Used by the SAM targeting path.
pub fn attacker_prefab_excluded(data: &PolicyData, attacker: &EntitySnapshot) -> bool {
    data.groups
        .iter()
        .any(|g| g.excludes_prefab(&attacker.prefab) || g.excludes_prefab(&attacker.type_tag))
}
