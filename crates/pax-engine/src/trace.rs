//! # Trace Mode — Narrated Decisions
//!
//! Operators flip trace mode on to watch the engine think: every decision
//! emits its checkpoints as indented lines under the `pax::trace` tracing
//! target. Trace mode self-expires after five minutes so a forgotten
//! toggle cannot spam logs forever; re-enabling replaces the deadline.
//!
//! Expiry is lazy. There is no timer thread; the deadline is checked
//! whenever a decision asks whether tracing is live, and clears itself
//! when found stale.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Trace mode lifetime per toggle.
pub const TRACE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared on/off state with a self-clearing deadline.
#[derive(Debug, Default)]
pub struct TraceState {
    on: AtomicBool,
    expires: Mutex<Option<Instant>>,
}

impl TraceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        *self.expires.lock() = Some(Instant::now() + TRACE_TIMEOUT);
        self.on.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.on.store(false, Ordering::Relaxed);
        *self.expires.lock() = None;
    }

    /// Flips trace mode, returning the new state.
    pub fn toggle(&self) -> bool {
        if self.on.load(Ordering::Relaxed) {
            self.disable();
            false
        } else {
            self.enable();
            true
        }
    }

    /// Whether tracing is live right now. A stale deadline turns the mode
    /// off as a side effect.
    pub fn is_live(&self) -> bool {
        if !self.on.load(Ordering::Relaxed) {
            return false;
        }
        let expired = self
            .expires
            .lock()
            .map_or(false, |deadline| Instant::now() >= deadline);
        if expired {
            self.disable();
            return false;
        }
        true
    }
}

/// Per-decision trace emitter. Captures liveness once at decision start,
/// then writes indented checkpoint lines (one space per level) while live.
#[derive(Debug, Clone, Copy)]
pub struct Tracer {
    live: bool,
}

impl Tracer {
    pub fn new(state: &TraceState) -> Self {
        Self {
            live: state.is_live(),
        }
    }

    /// A tracer that never emits, for paths outside an engine.
    pub fn silent() -> Self {
        Self { live: false }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn line(&self, indent: usize, message: &str) {
        if self.live {
            debug!(target: "pax::trace", "{:indent$}{message}", "");
        }
    }
}

/// Renders a name list the way trace lines expect: comma-joined, or the
/// word "none".
pub fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
