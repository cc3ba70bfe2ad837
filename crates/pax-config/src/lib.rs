//! # pax-config — Persisted Policy Configuration
//!
//! Everything the engine remembers across restarts lives here: the
//! [`PolicyData`] schema (options, mappings, schedule, rule sets, groups),
//! the compiled-in defaults a fresh install starts from, and the JSON
//! [`ConfigStore`] with its self-repair and version-migration behavior.
//!
//! The crate is deliberately engine-agnostic: it knows how to validate and
//! persist configuration, not how to decide damage. Mutations return
//! structured outcomes ([`MappingChange`]) so front ends can report exactly
//! what happened.

pub mod data;
pub mod defaults;
pub mod error;
pub mod store;

pub use data::{EngineOption, MappingChange, PolicyData, ALL_ZONES, EXCLUDE};
pub use defaults::{apply_default_policy, default_data, CONFIG_VERSION};
pub use error::{ConfigError, ConfigResult};
pub use store::ConfigStore;
