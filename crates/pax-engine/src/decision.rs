//! # Decision Chains — Damage, Targeting, Traps, Gathering
//!
//! [`DecisionContext`] runs the ordered checks that turn an event into a
//! [`Verdict`]. The damage chain is the long one: override hook, engine
//! gates, unconditional allows, zone exclusion, then flag-driven checks
//! from most specific (locks, aerial, sentries) to least (rule
//! evaluation). Every step either decides and returns or falls through;
//! nothing here errors.
//!
//! A context borrows one consistent view of the configuration for its
//! whole run, so a decision never observes a half-applied mutation.

use std::borrow::Cow;

use tracing::info;

use pax_config::{EngineOption, PolicyData};
use pax_core::{
    BuildingGrade, DamageEvent, DamageKind, EntityKind, EntitySnapshot, LockState, PlayerInfo,
    RuleFlag, RuleSet, Verdict,
};

use crate::hooks::{BuildAuthority, OverrideHook, ZoneProvider};
use crate::resolver::GroupResolver;
use crate::trace::{name_list, Tracer};
use crate::zone;

/// Storage prefabs that can never hold a lock; the lock check ignores them.
const LOCK_EXEMPT_PREFABS: [&str; 11] = [
    "lantern.deployed",
    "ceilinglight.deployed",
    "furnace.large",
    "campfire",
    "furnace",
    "refinery_small_deployed",
    "waterbarrel",
    "jackolantern.angry",
    "jackolantern.happy",
    "repairbench_deployed",
    "researchtable_deployed",
];

/// One decision's view of the world: configuration, active rule set,
/// collaborators, and the trace emitter.
pub(crate) struct DecisionContext<'a> {
    pub data: &'a PolicyData,
    pub active_name: &'a str,
    pub resolver: &'a GroupResolver,
    pub zones: Option<&'a dyn ZoneProvider>,
    pub authority: Option<&'a dyn BuildAuthority>,
    pub hook: Option<&'a dyn OverrideHook>,
    pub enabled: bool,
    pub use_zones: bool,
    pub tracer: Tracer,
}

impl<'a> DecisionContext<'a> {
    // -----------------------------------------------------------------------
    // Damage
    // -----------------------------------------------------------------------

    /// The full damage chain. Steps run in order; the first decided answer
    /// wins.
    pub fn decide_damage(&self, event: &DamageEvent) -> Verdict {
        // Override hook preempts everything, including the engine gates.
        if let Some(hook) = self.hook {
            let answer = hook.can_take_damage(event);
            if answer.is_decided() {
                return answer;
            }
        }

        // Engine gates: disabled, damage handling off, or no usable
        // active rule set means the engine has no opinion at all.
        if !self.enabled || !self.data.option_enabled(EngineOption::HandleDamage) {
            return Verdict::NoOpinion;
        }
        match self.data.find_ruleset(self.active_name) {
            Some(active) if !active.is_empty() && active.enabled => {}
            _ => return Verdict::NoOpinion,
        }

        let victim = &event.victim;

        // Unconditional allows: decay, wild NPCs, door barricades and
        // covers, and loot props (water barrels excepted, they are real
        // storage).
        if event.kind == DamageKind::Decay {
            return Verdict::Allow;
        }
        if victim.kind == EntityKind::WildNpc {
            return Verdict::Allow;
        }
        if victim.kind == EntityKind::Barricade
            && (victim.prefab.contains("door_barricade") || victim.prefab.contains("cover"))
        {
            return Verdict::Allow;
        }
        if (victim.prefab.contains("barrel")
            || victim.prefab == "loot_trash"
            || victim.prefab == "giftbox_loot")
            && victim.prefab != "waterbarrel"
        {
            return Verdict::Allow;
        }

        let t = &self.tracer;
        if t.is_live() {
            t.line(0, "==== damage decision ====");
            match &event.attacker {
                Some(attacker) => {
                    t.line(1, &format!("from: {}, {}", attacker.type_tag, attacker.prefab))
                }
                None => t.line(1, "from: none"),
            }
            t.line(1, &format!("to: {}, {}", victim.type_tag, victim.prefab));
        }

        // Zones: exclusion short-circuits, otherwise they pick the rule set.
        let victim_keys = self.location_keys(victim);
        let attacker_keys = match &event.attacker {
            Some(attacker) => self.location_keys(attacker),
            None => Vec::new(),
        };
        if zone::is_excluded(self.data, &victim_keys, &attacker_keys, t) {
            return Verdict::Allow;
        }
        t.line(1, "no exclusion found; resolving rule set");
        let ruleset = zone::resolve_ruleset(
            self.data,
            self.active_name,
            &victim_keys,
            &attacker_keys,
            t,
        );
        let ruleset: &RuleSet = &ruleset;
        t.line(1, &format!("using rule set {:?}", ruleset.name));

        if victim.kind == EntityKind::LightAircraft
            && event.is_self_inflicted()
            && ruleset.has_flag(RuleFlag::LightAircraftCollisionImmunity)
        {
            t.line(1, "light aircraft collision; deny");
            return Verdict::Deny;
        }

        if event.kind == DamageKind::Suicide {
            if ruleset.has_flag(RuleFlag::SuicideBlocked) {
                t.line(1, "suicide blocked by flag; deny");
                info!(victim = %victim.id, "suicide blocked");
                return Verdict::Deny;
            }
            t.line(1, "suicide not blocked; allow");
            return Verdict::Allow;
        }

        if ruleset.has_flag(RuleFlag::SelfDamage) && event.is_self_inflicted() {
            t.line(1, "self damage allowed by flag");
            return Verdict::Allow;
        }

        // Locks make storage and doors immortal while locked.
        let lock_flagged = (victim.kind == EntityKind::Storage
            && ruleset.has_flag(RuleFlag::LockedStorageImmortal))
            || (victim.kind == EntityKind::Door
                && ruleset.has_flag(RuleFlag::LockedDoorsImmortal));
        if lock_flagged {
            match self.check_lock(ruleset, victim, event) {
                Some(verdict) => {
                    t.line(
                        1,
                        &format!(
                            "immortal-flagged target lock check: {}",
                            if verdict.is_allow() { "allow" } else { "deny" }
                        ),
                    );
                    return verdict;
                }
                None => t.line(1, "no lock or unlocked; continuing"),
            }
        }

        // Aerial initiators get their own flag family before anything
        // attacker-specific.
        if let Some(base) = self.aerial_initiator(ruleset, event) {
            if victim.is_player() {
                let blocked = ruleset.has_flag(RuleFlag::NoAerialDamagePlayers);
                t.line(
                    1,
                    &format!(
                        "aerial initiator against player; {}",
                        if blocked { "deny" } else { "allow" }
                    ),
                );
                return Verdict::from_allow(!blocked);
            }
            if victim.kind == EntityKind::ResourceExtractor {
                let blocked = ruleset.has_flag(RuleFlag::NoAerialDamageExtractors);
                t.line(
                    1,
                    &format!(
                        "aerial initiator against extractor; {}",
                        if blocked { "deny" } else { "allow" }
                    ),
                );
                return Verdict::from_allow(!blocked);
            }
            t.line(
                1,
                &format!(
                    "aerial initiator; {}",
                    if base.is_allow() { "allow" } else { "deny" }
                ),
            );
            return base;
        }

        if let Some(base) = self.sentry_initiator(ruleset, event) {
            if victim.acting_player().map_or(false, |p| p.npc) {
                let blocked = ruleset.has_flag(RuleFlag::NoSentryDamageNpcs);
                t.line(
                    1,
                    &format!(
                        "sentry initiator against npc player; {}",
                        if blocked { "deny" } else { "allow" }
                    ),
                );
                return Verdict::from_allow(!blocked);
            }
            if victim.is_player() {
                let blocked = ruleset.has_flag(RuleFlag::NoSentryDamagePlayers);
                t.line(
                    1,
                    &format!(
                        "sentry initiator against player; {}",
                        if blocked { "deny" } else { "allow" }
                    ),
                );
                return Verdict::from_allow(!blocked);
            }
            t.line(
                1,
                &format!(
                    "sentry initiator; {}",
                    if base.is_allow() { "allow" } else { "deny" }
                ),
            );
            return base;
        }

        // Environmental damage has no attacker left to judge.
        let Some(attacker) = &event.attacker else {
            t.line(1, "no attacker; allow");
            return Verdict::Allow;
        };

        if attacker.kind == EntityKind::LightAircraft && victim.kind == EntityKind::BuildingBlock {
            t.line(1, "light aircraft against building; evaluating rules");
            return self.evaluate_rules(ruleset, attacker, victim);
        }

        if ruleset.has_flag(RuleFlag::ProtectedSleepers)
            && attacker.kind == EntityKind::WildNpc
            && victim.is_sleeping_player()
        {
            t.line(1, "sleeping player protected from wild npc; deny");
            return Verdict::Deny;
        }

        if attacker.kind == EntityKind::WildNpc {
            t.line(1, "attacker is wild npc; allow");
            return Verdict::Allow;
        }

        if ruleset.has_flag(RuleFlag::AuthorizedDamage) && !victim.is_player() {
            if let Some(info) = attacker.acting_player() {
                if self.check_authorized(ruleset, attacker, info, victim) {
                    if victim.kind == EntityKind::SamSite {
                        t.line(1, "target is a SAM site; evaluating rules");
                        return self.evaluate_rules(ruleset, attacker, victim);
                    }
                    t.line(1, "attacker authorized over non-player target; allow");
                    return Verdict::Allow;
                }
            }
        }

        if ruleset.has_flag(RuleFlag::AdminsHurtSleepers)
            && victim.is_sleeping_player()
            && attacker.acting_player().map_or(false, |p| p.admin)
        {
            t.line(1, "admin against sleeping player; allow");
            return Verdict::Allow;
        }

        if ruleset.has_flag(RuleFlag::HumanNpcDamage) && victim.is_player() {
            if let Some(info) = attacker.acting_player() {
                let human_npc_involved = info.is_human_npc()
                    || victim.acting_player().map_or(false, PlayerInfo::is_human_npc);
                if human_npc_involved {
                    t.line(1, "human-controlled npc involved; allow");
                    return Verdict::Allow;
                }
            }
        }

        t.line(1, "no pre-check matched; evaluating rules");
        self.evaluate_rules(ruleset, attacker, victim)
    }

    // -----------------------------------------------------------------------
    // Targeting and traps
    // -----------------------------------------------------------------------

    /// Whether a sentry may target `target`. `sentry_weapon` is the short
    /// name of the item mounted in the sentry, when there is one.
    pub fn can_be_targeted(
        &self,
        target: &EntitySnapshot,
        sentry: &EntitySnapshot,
        sentry_weapon: Option<&str>,
    ) -> Verdict {
        // Aerial-unit guns target whoever they like.
        if sentry.kind == EntityKind::AerialUnit {
            return Verdict::NoOpinion;
        }
        if self.hook_allows_targeting(target, sentry) {
            return Verdict::NoOpinion;
        }
        let Some(info) = target.acting_player() else {
            return Verdict::NoOpinion;
        };

        let target_keys = self.location_keys(target);
        let sentry_keys = self.location_keys(sentry);
        let ruleset = self.resolve(&target_keys, &sentry_keys);

        if info.npc && ruleset.has_flag(RuleFlag::SentriesIgnoreNpcs) {
            return Verdict::Deny;
        }
        if !info.npc && ruleset.has_flag(RuleFlag::SentriesIgnorePlayers) {
            // Toy weapons may target anyone.
            if sentry_weapon.map_or(false, |w| w.starts_with("fun.")) {
                return Verdict::NoOpinion;
            }
            if zone::is_excluded(self.data, &target_keys, &sentry_keys, &self.tracer) {
                return Verdict::NoOpinion;
            }
            return Verdict::Deny;
        }
        Verdict::NoOpinion
    }

    /// Whether a SAM site may target `target` (a mounted player).
    pub fn can_sam_target(&self, target: &EntitySnapshot, sam: &EntitySnapshot) -> Verdict {
        if target.acting_player().is_none() {
            return Verdict::NoOpinion;
        }
        if self.hook_allows_targeting(target, sam) {
            return Verdict::NoOpinion;
        }

        let target_keys = self.location_keys(target);
        let sam_keys = self.location_keys(sam);
        let ruleset = self.resolve(&target_keys, &sam_keys);

        if ruleset.has_flag(RuleFlag::SamSitesIgnorePlayers) {
            if zone::is_excluded(self.data, &target_keys, &sam_keys, &self.tracer) {
                return Verdict::NoOpinion;
            }
            if zone::attacker_prefab_excluded(self.data, sam) {
                return Verdict::NoOpinion;
            }
            return Verdict::Deny;
        }
        Verdict::NoOpinion
    }

    /// Whether a trap may trigger against `entity`.
    pub fn can_trap_trigger(&self, trap: &EntitySnapshot, entity: &EntitySnapshot) -> Verdict {
        let Some(info) = entity.acting_player() else {
            return Verdict::NoOpinion;
        };
        if let Some(hook) = self.hook {
            if hook.can_trap_trigger(trap, entity).is_allow() {
                return Verdict::NoOpinion;
            }
        }

        let trap_keys = self.location_keys(trap);
        let entity_keys = self.location_keys(entity);
        let ruleset = self.resolve(&trap_keys, &entity_keys);

        if info.npc && ruleset.has_flag(RuleFlag::TrapsIgnoreNpcs) {
            return Verdict::Deny;
        }
        if ruleset.has_flag(RuleFlag::TrapsIgnorePlayers) {
            return Verdict::Deny;
        }
        Verdict::NoOpinion
    }

    /// Gather guard: resource-node hits by players route through the full
    /// damage chain so rule sets can block gathering. Anything else is not
    /// this guard's business.
    pub fn decide_gather(&self, event: &DamageEvent) -> Verdict {
        if event.victim.kind != EntityKind::ResourceNode {
            return Verdict::NoOpinion;
        }
        if event.acting_player().is_none() {
            return Verdict::NoOpinion;
        }
        match self.decide_damage(event) {
            Verdict::Deny => Verdict::Deny,
            _ => Verdict::NoOpinion,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn location_keys(&self, entity: &EntitySnapshot) -> Vec<String> {
        if !self.use_zones {
            return Vec::new();
        }
        match self.zones {
            Some(provider) => provider.location_keys(entity),
            None => Vec::new(),
        }
    }

    fn resolve(&self, first_keys: &[String], second_keys: &[String]) -> Cow<'a, RuleSet> {
        zone::resolve_ruleset(self.data, self.active_name, first_keys, second_keys, &self.tracer)
    }

    fn hook_allows_targeting(&self, target: &EntitySnapshot, gun: &EntitySnapshot) -> bool {
        self.hook
            .map_or(false, |hook| hook.can_be_targeted(target, gun).is_allow())
    }

    /// Lock verdict for immortal-flagged storage and doors. `None` means
    /// the chain continues (no lock, unlocked, or a lockless deployable).
    fn check_lock(
        &self,
        ruleset: &RuleSet,
        victim: &EntitySnapshot,
        event: &DamageEvent,
    ) -> Option<Verdict> {
        if LOCK_EXEMPT_PREFABS.contains(&victim.prefab.as_str())
            || victim.prefab.contains("shutter")
        {
            return None;
        }
        match victim.lock {
            None | Some(LockState::Unlocked) => None,
            Some(LockState::Locked) => {
                // Locked means immortal, except to aerial attackers when
                // the rule set explicitly lets them through.
                if !ruleset.has_flag(RuleFlag::AerialDamageLocked)
                    || ruleset.has_flag(RuleFlag::NoAerialDamage)
                {
                    return Some(Verdict::Deny);
                }
                Some(self.aerial_initiator(ruleset, event).unwrap_or(Verdict::Deny))
            }
        }
    }

    /// The aerial-initiator base answer, or `None` if the initiator is not
    /// aerial. Aerial means an aerial-unit attacker, its fireball prefabs,
    /// or its rocket weapon prefabs.
    fn aerial_initiator(&self, ruleset: &RuleSet, event: &DamageEvent) -> Option<Verdict> {
        if let Some(attacker) = &event.attacker {
            if attacker.kind == EntityKind::AerialUnit
                || attacker.prefab == "oilfireballsmall"
                || attacker.prefab == "napalm"
            {
                return Some(Verdict::from_allow(!ruleset.has_flag(RuleFlag::NoAerialDamage)));
            }
        }
        if let Some(weapon) = &event.weapon_prefab {
            if weapon == "rocket_heli" || weapon == "rocket_heli_napalm" {
                return Some(Verdict::from_allow(!ruleset.has_flag(RuleFlag::NoAerialDamage)));
            }
        }
        None
    }

    /// The sentry-initiator base answer, or `None` if no sentry is behind
    /// the shot.
    fn sentry_initiator(&self, ruleset: &RuleSet, event: &DamageEvent) -> Option<Verdict> {
        if event.weapon_in_sentry {
            self.tracer.line(2, "weapon is mounted in a sentry");
        } else if event
            .attacker
            .as_ref()
            .map_or(false, |a| a.kind == EntityKind::Sentry)
        {
            self.tracer.line(2, "attacker is a sentry");
        } else {
            return None;
        }
        Some(Verdict::from_allow(
            !ruleset.has_flag(RuleFlag::NoSentryDamagePlayers),
        ))
    }

    /// Whether the acting player holds authority over the victim entity:
    /// twig grace, ownership, then building privilege.
    fn check_authorized(
        &self,
        ruleset: &RuleSet,
        attacker: &EntitySnapshot,
        info: &PlayerInfo,
        victim: &EntitySnapshot,
    ) -> bool {
        if ruleset.has_flag(RuleFlag::TwigDamage)
            && victim.kind == EntityKind::BuildingBlock
            && victim.grade == Some(BuildingGrade::Twig)
        {
            self.tracer.line(2, "twig destruction allowed");
            return true;
        }

        match victim.owner_id() {
            None => return true,
            Some(owner) if !ruleset.has_flag(RuleFlag::CupboardOwnership) && info.id == owner => {
                return true
            }
            Some(_) => {}
        }

        let blocked = self
            .authority
            .map_or(false, |a| a.is_building_blocked(attacker, victim));
        if blocked {
            return false;
        }

        if !ruleset.has_flag(RuleFlag::CupboardOwnership) {
            return self
                .authority
                .map_or(false, |a| a.is_build_authorized(attacker, victim));
        }
        true
    }

    /// Resolves both parties' groups and asks the rule set.
    fn evaluate_rules(
        &self,
        ruleset: &RuleSet,
        attacker: &EntitySnapshot,
        victim: &EntitySnapshot,
    ) -> Verdict {
        let attacker_groups = self.resolver.resolve(&self.data.groups, attacker);
        let victim_groups = self.resolver.resolve(&self.data.groups, victim);
        let t = &self.tracer;
        if t.is_live() {
            t.line(2, &format!("attacker group matches: {}", name_list(&attacker_groups)));
            t.line(2, &format!("victim group matches: {}", name_list(&victim_groups)));
        }
        let matched = ruleset.decide(&attacker_groups, &victim_groups);
        t.line(2, &format!("{matched}"));
        Verdict::from_allow(matched.allow())
    }
}

// ---------------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------------
