//! # Behavior Flags — Named Rule-Set Modifiers
//!
//! Defines the [`RuleFlag`] enum and the [`FlagSet`] collection a rule set
//! carries. Flags modify the decision chain ahead of group-rule evaluation:
//! lock immortality, vehicle and sentry exceptions, sleeper protection,
//! ownership-based authorization, and similar special cases.
//!
//! Flags are named, not numbered. The persisted form is a list of
//! snake_case flag names; raw bit positions appear nowhere in the public
//! contract, and every `match` on `RuleFlag` is exhaustive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PaxError;

/// A single rule-set behavior flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleFlag {
    /// Block the self-kill command.
    SuicideBlocked,
    /// Players authorized over a placement may damage it regardless of rules.
    AuthorizedDamage,
    /// Patrol aircraft deal no damage.
    NoAerialDamage,
    /// Aerial damage penetrates locked storage and doors.
    AerialDamageLocked,
    /// Patrol aircraft deal no damage to players.
    NoAerialDamagePlayers,
    /// Damage is allowed when either side is a human-shaped scripted NPC.
    HumanNpcDamage,
    /// Locked storage containers take no damage.
    LockedStorageImmortal,
    /// Locked doors take no damage.
    LockedDoorsImmortal,
    /// Admins may hurt sleeping players.
    AdminsHurtSleepers,
    /// Wild NPCs cannot hurt sleeping players.
    ProtectedSleepers,
    /// Traps do not trigger on players.
    TrapsIgnorePlayers,
    /// Sentries do not target players.
    SentriesIgnorePlayers,
    /// Authorization follows territorial claim instead of direct ownership.
    CupboardOwnership,
    /// Entities may damage themselves.
    SelfDamage,
    /// Twig-tier building blocks may be damaged by anyone.
    TwigDamage,
    /// Sentries deal no damage to players.
    NoSentryDamagePlayers,
    /// Patrol aircraft deal no damage to resource extractors.
    NoAerialDamageExtractors,
    /// Sentries deal no damage to NPC players.
    NoSentryDamageNpcs,
    /// Sentries do not target NPC players.
    SentriesIgnoreNpcs,
    /// Traps do not trigger on NPC players.
    TrapsIgnoreNpcs,
    /// Light aircraft take no collision damage from themselves.
    LightAircraftCollisionImmunity,
    /// SAM sites do not target player-occupied vehicles.
    SamSitesIgnorePlayers,
}

impl RuleFlag {
    /// Every flag, in declaration order.
    pub const ALL: [RuleFlag; 22] = [
        Self::SuicideBlocked,
        Self::AuthorizedDamage,
        Self::NoAerialDamage,
        Self::AerialDamageLocked,
        Self::NoAerialDamagePlayers,
        Self::HumanNpcDamage,
        Self::LockedStorageImmortal,
        Self::LockedDoorsImmortal,
        Self::AdminsHurtSleepers,
        Self::ProtectedSleepers,
        Self::TrapsIgnorePlayers,
        Self::SentriesIgnorePlayers,
        Self::CupboardOwnership,
        Self::SelfDamage,
        Self::TwigDamage,
        Self::NoSentryDamagePlayers,
        Self::NoAerialDamageExtractors,
        Self::NoSentryDamageNpcs,
        Self::SentriesIgnoreNpcs,
        Self::TrapsIgnoreNpcs,
        Self::LightAircraftCollisionImmunity,
        Self::SamSitesIgnorePlayers,
    ];

    /// Stable snake_case name, matching the persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuicideBlocked => "suicide_blocked",
            Self::AuthorizedDamage => "authorized_damage",
            Self::NoAerialDamage => "no_aerial_damage",
            Self::AerialDamageLocked => "aerial_damage_locked",
            Self::NoAerialDamagePlayers => "no_aerial_damage_players",
            Self::HumanNpcDamage => "human_npc_damage",
            Self::LockedStorageImmortal => "locked_storage_immortal",
            Self::LockedDoorsImmortal => "locked_doors_immortal",
            Self::AdminsHurtSleepers => "admins_hurt_sleepers",
            Self::ProtectedSleepers => "protected_sleepers",
            Self::TrapsIgnorePlayers => "traps_ignore_players",
            Self::SentriesIgnorePlayers => "sentries_ignore_players",
            Self::CupboardOwnership => "cupboard_ownership",
            Self::SelfDamage => "self_damage",
            Self::TwigDamage => "twig_damage",
            Self::NoSentryDamagePlayers => "no_sentry_damage_players",
            Self::NoAerialDamageExtractors => "no_aerial_damage_extractors",
            Self::NoSentryDamageNpcs => "no_sentry_damage_npcs",
            Self::SentriesIgnoreNpcs => "sentries_ignore_npcs",
            Self::TrapsIgnoreNpcs => "traps_ignore_npcs",
            Self::LightAircraftCollisionImmunity => "light_aircraft_collision_immunity",
            Self::SamSitesIgnorePlayers => "sam_sites_ignore_players",
        }
    }
}

impl FromStr for RuleFlag {
    type Err = PaxError;

    /// Case-insensitive lookup by snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| PaxError::UnknownFlag(s.to_string()))
    }
}

impl fmt::Display for RuleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of behavior flags carried by a rule set.
///
/// Serializes as a list of flag names. An unrecognized name fails
/// deserialization, which callers treat as a configuration integrity
/// failure rather than silently dropping the flag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeSet<RuleFlag>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, flag: RuleFlag) -> bool {
        self.0.contains(&flag)
    }

    /// Inserts the flag. Returns false if it was already present.
    pub fn insert(&mut self, flag: RuleFlag) -> bool {
        self.0.insert(flag)
    }

    pub fn remove(&mut self, flag: RuleFlag) -> bool {
        self.0.remove(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<RuleFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = RuleFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<RuleFlag> for FlagSet {
    fn extend<I: IntoIterator<Item = RuleFlag>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(flag.as_str())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_every_variant_name_uniquely() {
        let names: BTreeSet<&str> = RuleFlag::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names.len(), RuleFlag::ALL.len());
    }

    #[test]
    fn test_from_str_round_trip() {
        for flag in RuleFlag::ALL {
            assert_eq!(flag.as_str().parse::<RuleFlag>().unwrap(), flag);
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            "SUICIDE_BLOCKED".parse::<RuleFlag>().unwrap(),
            RuleFlag::SuicideBlocked
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("no_such_flag".parse::<RuleFlag>().is_err());
    }

    #[test]
    fn test_flag_set_serializes_as_name_list() {
        let set: FlagSet = [RuleFlag::SelfDamage, RuleFlag::SuicideBlocked]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[\"suicide_blocked\",\"self_damage\"]");
        let back: FlagSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_flag_set_rejects_unknown_name() {
        let result: Result<FlagSet, _> = serde_json::from_str("[\"not_a_flag\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_flag_set_operations() {
        let mut set = FlagSet::new();
        assert!(set.is_empty());
        assert!(set.insert(RuleFlag::TwigDamage));
        assert!(!set.insert(RuleFlag::TwigDamage));
        assert!(set.contains(RuleFlag::TwigDamage));
        assert_eq!(set.len(), 1);
        assert!(set.remove(RuleFlag::TwigDamage));
        assert!(set.is_empty());
    }
}
