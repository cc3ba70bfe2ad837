//! # Boundary Traits — What the Host World Provides
//!
//! The engine never talks to a game directly. Everything it needs from the
//! outside comes through four small traits: an override hook that may
//! preempt any decision, a zone provider, a building-authorization oracle,
//! and a clock. Hosts implement whichever seams they have; every trait has
//! a no-op default or a std implementation.

use pax_core::{DamageEvent, EntitySnapshot, Verdict, WeekTime};

/// External veto/approve hook consulted before the engine's own logic.
///
/// All methods default to [`Verdict::NoOpinion`], which defers to the
/// engine. Answers are typed; a collaborator cannot return something the
/// engine has to guess about.
pub trait OverrideHook: Send + Sync {
    /// May this damage event proceed?
    fn can_take_damage(&self, _event: &DamageEvent) -> Verdict {
        Verdict::NoOpinion
    }

    /// May `sentry` target `target`?
    fn can_be_targeted(&self, _target: &EntitySnapshot, _sentry: &EntitySnapshot) -> Verdict {
        Verdict::NoOpinion
    }

    /// May `trap` trigger against `entity`?
    fn can_trap_trigger(&self, _trap: &EntitySnapshot, _entity: &EntitySnapshot) -> Verdict {
        Verdict::NoOpinion
    }
}

/// Maps entities to the location keys (zones) containing them.
pub trait ZoneProvider: Send + Sync {
    /// Zero or more location keys, provider-defined order.
    fn location_keys(&self, entity: &EntitySnapshot) -> Vec<String>;
}

/// Answers building-privilege questions for player/entity pairs.
///
/// Absent an implementation the engine treats players as neither blocked
/// nor authorized.
pub trait BuildAuthority: Send + Sync {
    /// Whether building privilege actively blocks this player at the
    /// entity's position.
    fn is_building_blocked(&self, player: &EntitySnapshot, entity: &EntitySnapshot) -> bool;

    /// Whether the player holds building authorization at the entity's
    /// position.
    fn is_build_authorized(&self, player: &EntitySnapshot, entity: &EntitySnapshot) -> bool;
}

/// Time source for schedule resolution.
pub trait WorldClock: Send + Sync {
    /// Wall-clock position within the week.
    fn week_position(&self) -> WeekTime;

    /// The simulated world's time of day. Hosts without an in-world clock
    /// return the wall-clock time of day.
    fn world_time_of_day(&self) -> WeekTime;
}

/// [`WorldClock`] backed by the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WorldClock for SystemClock {
    fn week_position(&self) -> WeekTime {
        use chrono::{Datelike, Local, Timelike};
        let now = Local::now();
        let day = now.weekday().num_days_from_sunday();
        WeekTime::new(day, now.hour(), now.minute(), now.second())
            .unwrap_or_else(|| WeekTime::from_secs(0))
    }

    fn world_time_of_day(&self) -> WeekTime {
        self.week_position().time_of_day()
    }
}
