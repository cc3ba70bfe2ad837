//! # pax-cli — Pax Command-Line Interface
//!
//! Operator tooling for working with policy configurations outside a live
//! host: checking files for problems, generating the stock configuration,
//! editing mappings and schedules in place, and replaying captured damage
//! events to see how the engine would rule.
//!
//! ## Subcommands
//!
//! - `validate` — Check a configuration file for problems
//! - `defaults` — Write or print the stock configuration
//! - `map` — List and edit location mappings
//! - `sched` — Inspect, toggle, and preview the rotation schedule
//! - `simulate` — Replay a damage event against a configuration
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `pax-config` and `pax-engine`; no
//!   decision or persistence logic lives here.
//! - Handlers print to stdout and reserve stderr for logs and traces.

pub mod defaults;
pub mod mapping;
pub mod schedule;
pub mod simulate;
pub mod validate;
