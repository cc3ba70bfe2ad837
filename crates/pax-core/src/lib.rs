//! # pax-core — Foundational Types for the Pax Policy Engine
//!
//! This crate defines the vocabulary of damage-policy decisions: entity
//! snapshots and damage events, behavior flags, entity groups, the natural
//! language rule grammar, rule sets with their precedence ladder, and
//! time-of-week schedules. Every other crate in the workspace depends on
//! `pax-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Three-valued verdicts.** [`Verdict`] distinguishes "allow", "deny",
//!    and "no opinion" explicitly. No nullable booleans, no sentinel values.
//!
//! 2. **Named behavior flags.** [`RuleFlag`] is an exhaustive enum and
//!    [`FlagSet`] persists flags by name. Adding a flag forces every
//!    consumer to handle it; a typo in a config file is a load-time error
//!    rather than a silently ignored bit.
//!
//! 3. **Lossless parsing.** Rule sentences and schedule entries never fail
//!    to parse into *something*: malformed input is retained, marked
//!    invalid, and surfaced for diagnostics, while evaluation consults only
//!    the valid remainder.
//!
//! 4. **Deterministic precedence.** Rule lookup walks exact pairs, then
//!    source wildcards, then target wildcards, then the set default; within
//!    a tier the first declaration wins. No scoring, no ambiguity.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pax-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All persisted types derive `Serialize`/`Deserialize` with snake_case
//!   field names.

pub mod entity;
pub mod error;
pub mod flags;
pub mod group;
pub mod rule;
pub mod ruleset;
pub mod schedule;
pub mod verdict;

// Re-export primary types for ergonomic imports.
pub use entity::{
    BuildingGrade, DamageEvent, DamageKind, EntityId, EntityKind, EntitySnapshot, LockState,
    PlayerInfo, ACCOUNT_ID_FLOOR,
};
pub use error::PaxError;
pub use flags::{FlagSet, RuleFlag};
pub use group::EntityGroup;
pub use rule::{Rule, ANY};
pub use ruleset::{RuleMatch, RuleSet};
pub use schedule::{Schedule, ScheduleEntry, WeekTime};
pub use verdict::Verdict;
