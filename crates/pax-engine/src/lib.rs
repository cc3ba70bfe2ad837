//! # pax-engine — Damage Policy Decisions
//!
//! The runtime half of the Pax policy engine: it loads a [`pax_config`]
//! configuration, keeps one rule set active (by hand or on a schedule),
//! and answers damage, targeting, trap, and gather questions with a
//! three-valued [`pax_core::Verdict`].
//!
//! ## Decision model
//!
//! Every question runs an ordered chain: an override hook first, then the
//! engine gates, then location exclusions and rule-set resolution, then
//! flag-driven checks from most to least specific, and finally group-pair
//! rule evaluation. The first decided answer wins. Callers treat
//! `NoOpinion` as "defer to whatever the world would do anyway".
//!
//! ## Integration seams
//!
//! The engine knows nothing about any particular game world. Hosts plug in
//! what they have: a [`ZoneProvider`] for location keys, a
//! [`BuildAuthority`] for building privilege, an [`OverrideHook`] for
//! external vetoes, and a [`WorldClock`] for schedule time. All are
//! optional except the clock, which defaults to the system clock.
//!
//! ## Concurrency
//!
//! [`PolicyEngine`] is `Send + Sync` and takes `&self` everywhere.
//! Decisions share read locks; operator commands take the write side and
//! persist through the attached store. Group membership is cached per
//! entity in a concurrent map and invalidated on despawn.

mod decision;
pub mod engine;
pub mod hooks;
pub mod resolver;
pub mod trace;
mod zone;

// Re-export primary types for ergonomic imports.
pub use engine::{ActiveContext, PolicyEngine};
pub use hooks::{BuildAuthority, OverrideHook, SystemClock, WorldClock, ZoneProvider};
pub use resolver::GroupResolver;
pub use trace::{TraceState, Tracer, TRACE_TIMEOUT};
