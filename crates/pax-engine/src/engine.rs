//! # Policy Engine — Shared State and Operator Surface
//!
//! [`PolicyEngine`] owns the live configuration, the rule set currently in
//! force, the group-membership cache, and the runtime toggles. Decision
//! calls read everything under one lock acquisition; operator calls take
//! the write side, persist through the attached store, and refresh
//! whatever the change invalidates.
//!
//! Lock order is data before active, everywhere. Decisions hold read
//! guards only for the duration of one chain run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use pax_config::{
    apply_default_policy, ConfigResult, ConfigStore, EngineOption, MappingChange, PolicyData,
    CONFIG_VERSION,
};
use pax_core::{DamageEvent, EntityId, EntitySnapshot, Verdict};

use crate::decision::DecisionContext;
use crate::hooks::{BuildAuthority, OverrideHook, SystemClock, WorldClock, ZoneProvider};
use crate::resolver::GroupResolver;
use crate::trace::{TraceState, Tracer};

/// Schedule poll cadence against the wall clock.
const REALTIME_TICK: Duration = Duration::from_secs(30);
/// Schedule poll cadence against the world clock, which can run fast.
const WORLD_TICK: Duration = Duration::from_secs(3);

/// The rule set currently in force and the broadcast riding with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveContext {
    pub ruleset: String,
    pub broadcast: Option<String>,
}

/// Long-lived engine shared across threads. Cheap to wrap in an [`Arc`];
/// every method takes `&self`.
pub struct PolicyEngine {
    data: RwLock<PolicyData>,
    active: RwLock<ActiveContext>,
    resolver: GroupResolver,
    enabled: AtomicBool,
    trace: TraceState,
    store: Option<ConfigStore>,
    zones: Option<Arc<dyn ZoneProvider>>,
    authority: Option<Arc<dyn BuildAuthority>>,
    hook: Option<Arc<dyn OverrideHook>>,
    clock: Arc<dyn WorldClock>,
}

impl PolicyEngine {
    /// Builds an engine over already-loaded configuration. The default
    /// rule set becomes active; a missing default is tolerated (the engine
    /// simply has no opinion until the schedule or an operator fixes it).
    pub fn new(mut data: PolicyData) -> Self {
        data.init();
        let active_name = match data.default_ruleset() {
            Some(ruleset) => ruleset.name.clone(),
            None => {
                warn!(name = %data.default_ruleset, "default rule set missing; engine idle");
                data.default_ruleset.clone()
            }
        };
        Self {
            data: RwLock::new(data),
            active: RwLock::new(ActiveContext {
                ruleset: active_name,
                broadcast: None,
            }),
            resolver: GroupResolver::default(),
            enabled: AtomicBool::new(true),
            trace: TraceState::default(),
            store: None,
            zones: None,
            authority: None,
            hook: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Loads configuration through the store and keeps the store attached
    /// for persistence.
    pub fn from_store(store: ConfigStore) -> ConfigResult<Self> {
        let data = store.load()?;
        Ok(Self::new(data).with_store(store))
    }

    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_zones(mut self, zones: Arc<dyn ZoneProvider>) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn with_authority(mut self, authority: Arc<dyn BuildAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn OverrideHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn WorldClock>) -> Self {
        self.clock = clock;
        self
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    pub fn decide_damage(&self, event: &DamageEvent) -> Verdict {
        let data = self.data.read();
        let active = self.active.read();
        self.context(&data, &active).decide_damage(event)
    }

    pub fn can_be_targeted(
        &self,
        target: &EntitySnapshot,
        sentry: &EntitySnapshot,
        sentry_weapon: Option<&str>,
    ) -> Verdict {
        let data = self.data.read();
        let active = self.active.read();
        self.context(&data, &active)
            .can_be_targeted(target, sentry, sentry_weapon)
    }

    pub fn can_sam_target(&self, target: &EntitySnapshot, sam: &EntitySnapshot) -> Verdict {
        let data = self.data.read();
        let active = self.active.read();
        self.context(&data, &active).can_sam_target(target, sam)
    }

    pub fn can_trap_trigger(&self, trap: &EntitySnapshot, entity: &EntitySnapshot) -> Verdict {
        let data = self.data.read();
        let active = self.active.read();
        self.context(&data, &active).can_trap_trigger(trap, entity)
    }

    pub fn decide_gather(&self, event: &DamageEvent) -> Verdict {
        let data = self.data.read();
        let active = self.active.read();
        self.context(&data, &active).decide_gather(event)
    }

    fn context<'a>(&'a self, data: &'a PolicyData, active: &'a ActiveContext) -> DecisionContext<'a> {
        DecisionContext {
            data,
            active_name: &active.ruleset,
            resolver: &self.resolver,
            zones: self.zones.as_deref(),
            authority: self.authority.as_deref(),
            hook: self.hook.as_deref(),
            enabled: self.enabled.load(Ordering::Relaxed),
            use_zones: self.effective_use_zones(data),
            tracer: Tracer::new(&self.trace),
        }
    }

    /// Zones only matter when the option is on, a provider exists, and the
    /// mapping table says more than "default everywhere".
    fn effective_use_zones(&self, data: &PolicyData) -> bool {
        if !data.option_enabled(EngineOption::UseZones) || self.zones.is_none() {
            return false;
        }
        !(data.mappings.len() == 1 && data.mappings.contains_key(&data.default_ruleset))
    }

    // -----------------------------------------------------------------------
    // Schedule
    // -----------------------------------------------------------------------

    /// One schedule tick. Re-resolves which rule set should be in force and
    /// swaps it in when it changed (or on the first run, which must settle
    /// the initial state). Returns the broadcast message when the swap
    /// should be announced.
    pub fn clock_update(&self, first_run: bool) -> Option<String> {
        let data = self.data.read();
        if !data.schedule.enabled {
            return None;
        }
        let week = self.clock.week_position();
        let day = if data.schedule.use_realtime {
            week.time_of_day()
        } else {
            self.clock.world_time_of_day()
        };
        let entry = data.schedule.resolve(week, day)?;

        let mut active = self.active.write();
        active.broadcast = entry.message.clone();
        if active.ruleset == entry.ruleset && !first_run {
            return None;
        }
        if data.find_ruleset(&entry.ruleset).is_none() {
            warn!(name = %entry.ruleset, "schedule names a rule set that does not exist");
        }
        active.ruleset = entry.ruleset.clone();
        info!(name = %active.ruleset, "schedule activated rule set");
        if data.schedule.broadcast {
            entry.message.clone()
        } else {
            None
        }
    }

    /// The broadcast riding with the active entry, for players arriving
    /// between swaps. `None` unless the schedule runs with broadcasting on.
    pub fn current_broadcast(&self) -> Option<String> {
        let data = self.data.read();
        if !data.schedule.enabled || !data.schedule.broadcast {
            return None;
        }
        self.active.read().broadcast.clone()
    }

    /// How often [`clock_update`](Self::clock_update) wants to run.
    pub fn tick_interval(&self) -> Duration {
        if self.data.read().schedule.use_realtime {
            REALTIME_TICK
        } else {
            WORLD_TICK
        }
    }

    // -----------------------------------------------------------------------
    // Operator surface
    // -----------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "damage handling toggled");
    }

    /// Flips the enabled state, returning the new value.
    pub fn toggle_enabled(&self) -> bool {
        let now = !self.is_enabled();
        self.set_enabled(now);
        now
    }

    /// Flips decision tracing, returning the new state. Tracing switches
    /// itself back off after its timeout.
    pub fn toggle_trace(&self) -> bool {
        self.trace.toggle()
    }

    pub fn add_or_update_mapping(&self, key: &str, target: &str) -> ConfigResult<MappingChange> {
        let mut data = self.data.write();
        let change = data.add_or_update_mapping(key, target)?;
        self.persist(&data)?;
        Ok(change)
    }

    pub fn remove_mapping(&self, key: &str) -> ConfigResult<String> {
        let mut data = self.data.write();
        let previous = data.remove_mapping(key)?;
        self.persist(&data)?;
        Ok(previous)
    }

    pub fn set_schedule_enabled(&self, enabled: bool) -> ConfigResult<()> {
        let mut data = self.data.write();
        data.set_schedule_enabled(enabled)?;
        self.persist(&data)?;
        Ok(())
    }

    /// Swaps the default rule set and makes it active immediately.
    pub fn set_default_ruleset(&self, name: &str) -> ConfigResult<()> {
        let mut data = self.data.write();
        data.set_default_ruleset(name)?;
        self.persist(&data)?;
        let mut active = self.active.write();
        active.ruleset = name.to_string();
        active.broadcast = None;
        Ok(())
    }

    /// Throws away the configuration and restores the stock policy,
    /// keeping engine options as they are.
    pub fn reset_to_defaults(&self) -> ConfigResult<()> {
        let mut data = self.data.write();
        apply_default_policy(&mut data);
        data.config_version = CONFIG_VERSION.to_string();
        data.init();
        self.persist(&data)?;
        self.resolver.clear();
        let mut active = self.active.write();
        active.ruleset = data.default_ruleset.clone();
        active.broadcast = None;
        info!("configuration reset to defaults");
        Ok(())
    }

    fn persist(&self, data: &PolicyData) -> ConfigResult<()> {
        match &self.store {
            Some(store) => store.save(data),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Drops a despawned entity from the group cache.
    pub fn forget_entity(&self, id: EntityId) {
        self.resolver.invalidate(id);
    }

    pub fn active_ruleset_name(&self) -> String {
        self.active.read().ruleset.clone()
    }

    pub fn active(&self) -> ActiveContext {
        self.active.read().clone()
    }

    /// A copy of the live configuration, for display and diagnostics.
    pub fn snapshot(&self) -> PolicyData {
        self.data.read().clone()
    }
}

// ---------------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------------
