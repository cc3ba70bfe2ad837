//! # Entity Model — Engine-Facing World Snapshots
//!
//! The engine never touches live world objects. Callers project each entity
//! into an [`EntitySnapshot`] carrying exactly the facts the decision chains
//! read: identity, type tag, prefab name, category, lock slot, owner, and
//! the acting player (for vehicles, the mounted driver). A damage decision
//! consumes a [`DamageEvent`] built from two such snapshots plus weapon
//! metadata.
//!
//! ## Design
//!
//! Snapshots are cheap, owned, and serializable, so events can be captured,
//! replayed in tests, and fed to the CLI simulator from JSON files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest identifier issued to real platform accounts. Player identifiers
/// below this floor (and above zero) belong to human-shaped scripted NPCs.
pub const ACCOUNT_ID_FLOOR: u64 = 76_560_000_000_000_000;

/// Stable identity of a world entity. Used as the group-membership cache key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Broad category of a world entity, as the decision chains distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A player character, including scripted NPC players.
    Player,
    /// A wild animal or other non-player creature.
    WildNpc,
    /// A hostile patrol aircraft.
    AerialUnit,
    /// A player-pilotable light aircraft.
    LightAircraft,
    /// An automated gun turret.
    Sentry,
    /// A surface-to-air missile site.
    SamSite,
    /// A triggered trap.
    Trap,
    /// A storage container.
    Storage,
    /// A door or gate.
    Door,
    /// A structural building block.
    BuildingBlock,
    /// A barricade deployable.
    Barricade,
    /// A fuel-driven resource extractor.
    ResourceExtractor,
    /// A harvestable resource node.
    ResourceNode,
    /// Anything else.
    Other,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::WildNpc => "wild_npc",
            Self::AerialUnit => "aerial_unit",
            Self::LightAircraft => "light_aircraft",
            Self::Sentry => "sentry",
            Self::SamSite => "sam_site",
            Self::Trap => "trap",
            Self::Storage => "storage",
            Self::Door => "door",
            Self::BuildingBlock => "building_block",
            Self::Barricade => "barricade",
            Self::ResourceExtractor => "resource_extractor",
            Self::ResourceNode => "resource_node",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction tier of a building block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingGrade {
    Twig,
    Wood,
    Stone,
    Metal,
    TopTier,
}

/// State of a fitted lock. A snapshot with no lock slot carries `None`
/// instead of a `LockState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

/// The player acting through an entity.
///
/// For a player entity this is the player itself. For vehicles and other
/// mountables the caller resolves the driver (or any mounted occupant) and
/// records it here, which is how mounted attackers keep their player
/// semantics through the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Platform account id, or a sub-floor id for scripted human NPCs.
    pub id: u64,
    /// World-spawned NPC combatant (scientist-type), not a real account.
    #[serde(default)]
    pub npc: bool,
    #[serde(default)]
    pub sleeping: bool,
    #[serde(default)]
    pub admin: bool,
}

impl PlayerInfo {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            npc: false,
            sleeping: false,
            admin: false,
        }
    }

    /// Human-shaped scripted NPC, detected by identifier range.
    pub fn is_human_npc(&self) -> bool {
        self.id > 0 && self.id < ACCOUNT_ID_FLOOR
    }
}

/// Engine-facing projection of one world entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    /// Stable type tag (the entity's class-level name).
    pub type_tag: String,
    /// Short prefab name; defaults to the type tag when the host has no
    /// separate prefab concept.
    pub prefab: String,
    pub kind: EntityKind,
    /// Construction tier, for building blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<BuildingGrade>,
    /// Lock slot state; `None` when no lock is fitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockState>,
    /// Owning player's account id; `None` or zero means unowned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<u64>,
    /// The player acting through this entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerInfo>,
}

impl EntitySnapshot {
    pub fn new(id: impl Into<EntityId>, type_tag: impl Into<String>, kind: EntityKind) -> Self {
        let type_tag = type_tag.into();
        Self {
            id: id.into(),
            prefab: type_tag.clone(),
            type_tag,
            kind,
            grade: None,
            lock: None,
            owner: None,
            player: None,
        }
    }

    pub fn with_prefab(mut self, prefab: impl Into<String>) -> Self {
        self.prefab = prefab.into();
        self
    }

    pub fn with_grade(mut self, grade: BuildingGrade) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_lock(mut self, lock: LockState) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn with_owner(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_player(mut self, player: PlayerInfo) -> Self {
        self.player = Some(player);
        self
    }

    /// The player acting through this entity (itself, or a mounted occupant).
    pub fn acting_player(&self) -> Option<&PlayerInfo> {
        self.player.as_ref()
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    pub fn is_sleeping_player(&self) -> bool {
        self.is_player() && self.player.map_or(false, |p| p.sleeping)
    }

    /// Owner id, treating zero as unowned.
    pub fn owner_id(&self) -> Option<u64> {
        self.owner.filter(|&o| o != 0)
    }
}

/// Damage classification relevant to the decision chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Structural decay; always passes through.
    Decay,
    /// Self-inflicted kill command.
    Suicide,
    #[default]
    Generic,
}

/// One damage interaction, ready for a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub victim: EntitySnapshot,
    /// The initiating entity; `None` for environmental damage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker: Option<EntitySnapshot>,
    #[serde(default)]
    pub kind: DamageKind,
    /// Short prefab name of the weapon that produced the hit, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_prefab: Option<String>,
    /// The weapon (or its prefab) is parented to a sentry turret.
    #[serde(default)]
    pub weapon_in_sentry: bool,
}

impl DamageEvent {
    pub fn new(victim: EntitySnapshot) -> Self {
        Self {
            victim,
            attacker: None,
            kind: DamageKind::Generic,
            weapon_prefab: None,
            weapon_in_sentry: false,
        }
    }

    pub fn with_attacker(mut self, attacker: EntitySnapshot) -> Self {
        self.attacker = Some(attacker);
        self
    }

    pub fn with_kind(mut self, kind: DamageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_weapon_prefab(mut self, prefab: impl Into<String>) -> Self {
        self.weapon_prefab = Some(prefab.into());
        self
    }

    pub fn with_weapon_in_sentry(mut self) -> Self {
        self.weapon_in_sentry = true;
        self
    }

    /// The player acting on the attacking side, if any.
    pub fn acting_player(&self) -> Option<&PlayerInfo> {
        self.attacker.as_ref().and_then(|a| a.acting_player())
    }

    /// Attacker and victim are the same entity.
    pub fn is_self_inflicted(&self) -> bool {
        self.attacker.as_ref().map_or(false, |a| a.id == self.victim.id)
    }
}
