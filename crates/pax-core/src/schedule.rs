//! # Schedules — Time-Driven Rule-Set Rotation
//!
//! A [`Schedule`] names which rule set governs at which time of the week.
//! Entries are authored as text: `"<time> <rule-set> [broadcast message]"`,
//! where `<time>` is `[D.]HH:MM[:SS]` (day 0 is Sunday) or carries a `*.`
//! prefix marking the entry daily. [`Schedule::resolve`] picks the most
//! recent entry at or before "now", wrapping to the latest entry of the
//! cycle when none has fired yet.
//!
//! ## Clock sources
//!
//! With `use_realtime` the schedule runs on the wall clock as a position
//! within the week, and daily entries repeat every day (a daily entry wins
//! over a weekly one when its firing instant today is the more recent).
//! Without it the schedule runs on the world's time of day and every entry
//! is compared by time of day alone.
//!
//! ## Validity
//!
//! A schedule needs at least two valid entries naming at least two distinct
//! rule sets; anything less is forced disabled rather than rotating into a
//! corner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PaxError;

pub const DAY_SECS: u32 = 86_400;
pub const WEEK_SECS: u32 = 7 * DAY_SECS;

/// A position within the week, in seconds. Day 0 is Sunday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct WeekTime(u32);

impl WeekTime {
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Builds a week position from components. Returns `None` when a
    /// component is out of range (day 0..=6, hours 0..=23, minutes and
    /// seconds 0..=59).
    pub fn new(day: u32, hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        if day > 6 || hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self(
            day * DAY_SECS + hours * 3600 + minutes * 60 + seconds,
        ))
    }

    /// Parses `[D.]HH:MM[:SS]`.
    pub fn parse(text: &str) -> Result<Self, PaxError> {
        let err = || PaxError::InvalidWeekTime(text.to_string());
        let (day, clock) = match text.split_once('.') {
            Some((day, clock)) => (day.parse::<u32>().map_err(|_| err())?, clock),
            None => (0, text),
        };
        let mut parts = clock.split(':');
        let hours = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(err)?;
        let minutes = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(err)?;
        let seconds = match parts.next() {
            Some(p) => p.parse::<u32>().map_err(|_| err())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(err());
        }
        Self::new(day, hours, minutes, seconds).ok_or_else(err)
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Day-of-week component (0..=6 for in-week positions).
    pub fn day(self) -> u32 {
        self.0 / DAY_SECS
    }

    /// Time-of-day component.
    pub fn time_of_day(self) -> WeekTime {
        Self(self.0 % DAY_SECS)
    }

    /// Projects a time of day onto the given weekday, for comparing a
    /// daily entry's firing instant against weekly positions.
    pub fn at_day(self, day: u32) -> WeekTime {
        Self(day * DAY_SECS + self.0)
    }
}

impl fmt::Display for WeekTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = self.day();
        let rest = self.0 % DAY_SECS;
        let (h, m, s) = (rest / 3600, rest % 3600 / 60, rest % 60);
        if day > 0 {
            write!(f, "{day}.{h:02}:{m:02}:{s:02}")
        } else {
            write!(f, "{h:02}:{m:02}:{s:02}")
        }
    }
}

/// One parsed schedule entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Original text, as authored.
    pub text: String,
    /// Rule set the entry switches to.
    pub ruleset: String,
    /// Optional broadcast message.
    pub message: Option<String>,
    pub time: WeekTime,
    /// Fires every day at `time` (realtime schedules only).
    pub daily: bool,
    pub valid: bool,
}

impl ScheduleEntry {
    /// Translates entry text. Never fails; malformed text yields an entry
    /// with `valid == false`.
    pub fn parse(text: &str) -> Self {
        let mut entry = Self {
            text: text.to_string(),
            ruleset: String::new(),
            message: None,
            time: WeekTime::default(),
            daily: false,
            valid: false,
        };

        let trimmed = text.trim();
        let Some((mut time_tok, rest)) = split_token(trimmed) else {
            return entry;
        };
        let Some((ruleset, message)) = split_token(rest) else {
            return entry;
        };

        if let Some(stripped) = time_tok.strip_prefix("*.") {
            entry.daily = true;
            time_tok = stripped;
        }
        entry.ruleset = ruleset.to_string();
        if !message.is_empty() {
            entry.message = Some(message.to_string());
        }
        match WeekTime::parse(time_tok) {
            Ok(time) => {
                entry.time = time;
                entry.valid = true;
            }
            Err(_) => entry.valid = false,
        }
        entry
    }
}

/// Splits the leading whitespace-delimited token off `text`, returning the
/// token and the remainder (with its own leading whitespace trimmed, and
/// internal spacing preserved).
fn split_token(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((token, rest)) => Some((token, rest.trim_start())),
        None => Some((text, "")),
    }
}

/// A rotation of rule sets over the week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub use_realtime: bool,
    /// Announce rule-set switches to connected players.
    #[serde(default)]
    pub broadcast: bool,
    /// Authored entry text; the persisted form.
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(skip)]
    parsed: Vec<ScheduleEntry>,
    #[serde(skip)]
    valid: bool,
}

impl Schedule {
    /// Translates all entries and derives validity. An invalid schedule is
    /// forced disabled.
    pub fn init(&mut self) {
        self.parsed = self.entries.iter().map(|e| ScheduleEntry::parse(e)).collect();
        let valid_count = self.parsed.iter().filter(|e| e.valid).count();
        let mut names: Vec<&str> = self
            .parsed
            .iter()
            .filter(|e| e.valid)
            .map(|e| e.ruleset.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        self.valid = valid_count >= 2 && names.len() >= 2;
        if !self.valid {
            self.enabled = false;
        }
    }

    /// Derived by [`Schedule::init`].
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn parsed_entries(&self) -> &[ScheduleEntry] {
        &self.parsed
    }

    /// Entries that failed translation, for warning at load time.
    pub fn invalid_entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.parsed.iter().filter(|e| !e.valid)
    }

    /// Picks the entry governing "now": the most recent one at or before
    /// the clock, wrapping to the latest entry of the cycle when none has
    /// fired yet. `week_now` is the wall-clock week position, `day_now`
    /// the world (or wall) time of day; which one applies per entry
    /// depends on `use_realtime` and the entry's daily marker.
    pub fn resolve(&self, week_now: WeekTime, day_now: WeekTime) -> Option<&ScheduleEntry> {
        let now = if self.use_realtime { week_now } else { day_now };

        let mut chosen = None;
        if self.has_weekly_entries() {
            match self.pick_weekly(Some(now)) {
                Some(entry) => chosen = Some(entry),
                // Entries exist but none has fired yet this cycle.
                None => return self.resolve_wrapped(week_now),
            }
        }
        if self.use_realtime {
            chosen = Self::prefer_daily(chosen, self.pick_daily(Some(day_now)), week_now.day());
        }
        match chosen {
            Some(entry) => Some(entry),
            None => self.resolve_wrapped(week_now),
        }
    }

    /// Wrap-around pick: latest entry regardless of the clock.
    fn resolve_wrapped(&self, week_now: WeekTime) -> Option<&ScheduleEntry> {
        let mut chosen = if self.has_weekly_entries() {
            self.pick_weekly(None)
        } else {
            None
        };
        if self.use_realtime {
            chosen = Self::prefer_daily(chosen, self.pick_daily(None), week_now.day());
        }
        chosen
    }

    fn has_weekly_entries(&self) -> bool {
        self.parsed.iter().any(|e| !e.daily)
    }

    /// Most recent weekly candidate. In realtime mode daily entries are
    /// handled separately; otherwise everything competes by time of day.
    fn pick_weekly(&self, at_or_before: Option<WeekTime>) -> Option<&ScheduleEntry> {
        let eligible = |e: &&ScheduleEntry| {
            e.valid
                && (!self.use_realtime || !e.daily)
                && at_or_before.map_or(true, |now| e.time <= now)
        };
        let max = self.parsed.iter().filter(eligible).map(|e| e.time).max()?;
        self.parsed.iter().filter(eligible).find(|e| e.time == max)
    }

    fn pick_daily(&self, at_or_before: Option<WeekTime>) -> Option<&ScheduleEntry> {
        let eligible = |e: &&ScheduleEntry| {
            e.valid && e.daily && at_or_before.map_or(true, |now| e.time <= now)
        };
        let max = self.parsed.iter().filter(eligible).map(|e| e.time).max()?;
        self.parsed.iter().filter(eligible).find(|e| e.time == max)
    }

    /// A daily candidate wins when its projected firing instant today is
    /// more recent than the weekly candidate's.
    fn prefer_daily<'a>(
        weekly: Option<&'a ScheduleEntry>,
        daily: Option<&'a ScheduleEntry>,
        weekday: u32,
    ) -> Option<&'a ScheduleEntry> {
        match (weekly, daily) {
            (None, Some(d)) => Some(d),
            (Some(w), Some(d)) if d.time.at_day(weekday) > w.time => Some(d),
            (weekly, _) => weekly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- WeekTime parsing ----

    #[test]
    fn test_parse_hh_mm() {
        assert_eq!(WeekTime::parse("08:30").unwrap(), WeekTime::new(0, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_hh_mm_ss() {
        assert_eq!(
            WeekTime::parse("23:59:59").unwrap(),
            WeekTime::new(0, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_parse_with_day() {
        let t = WeekTime::parse("6.12:00").unwrap();
        assert_eq!(t.day(), 6);
        assert_eq!(t.time_of_day(), WeekTime::new(0, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(WeekTime::parse("24:00").is_err());
        assert!(WeekTime::parse("12:60").is_err());
        assert!(WeekTime::parse("7.08:00").is_err());
        assert!(WeekTime::parse("08:00:60").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(WeekTime::parse("").is_err());
        assert!(WeekTime::parse("8").is_err());
        assert!(WeekTime::parse("a:b").is_err());
        assert!(WeekTime::parse("1:2:3:4").is_err());
        assert!(WeekTime::parse("-1:00").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["08:30:00", "6.23:59:59", "00:00:01"] {
            let t = WeekTime::parse(text).unwrap();
            assert_eq!(format!("{t}"), text);
            assert_eq!(WeekTime::parse(&format!("{t}")).unwrap(), t);
        }
    }

    // ---- ScheduleEntry parsing ----

    #[test]
    fn test_entry_with_message() {
        let e = ScheduleEntry::parse("20:00 night PvP is now  enabled");
        assert!(e.valid);
        assert!(!e.daily);
        assert_eq!(e.ruleset, "night");
        assert_eq!(e.message.as_deref(), Some("PvP is now  enabled"));
        assert_eq!(e.time, WeekTime::new(0, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_entry_without_message() {
        let e = ScheduleEntry::parse("08:00 day");
        assert!(e.valid);
        assert_eq!(e.message, None);
    }

    #[test]
    fn test_daily_prefix() {
        let e = ScheduleEntry::parse("*.12:00 lunch");
        assert!(e.valid);
        assert!(e.daily);
        assert_eq!(e.time, WeekTime::new(0, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_entry_missing_ruleset_is_invalid() {
        assert!(!ScheduleEntry::parse("08:00").valid);
        assert!(!ScheduleEntry::parse("").valid);
    }

    #[test]
    fn test_entry_bad_time_is_invalid() {
        let e = ScheduleEntry::parse("25:00 day");
        assert!(!e.valid);
        // The rule-set name still parses, for diagnostics.
        assert_eq!(e.ruleset, "day");
    }

    // ---- Schedule validity ----

    fn schedule(entries: &[&str], use_realtime: bool) -> Schedule {
        let mut s = Schedule {
            enabled: true,
            use_realtime,
            broadcast: false,
            entries: entries.iter().map(|e| e.to_string()).collect(),
            ..Schedule::default()
        };
        s.init();
        s
    }

    #[test]
    fn test_single_entry_disables() {
        let s = schedule(&["08:00 day"], false);
        assert!(!s.is_valid());
        assert!(!s.enabled);
    }

    #[test]
    fn test_same_ruleset_everywhere_disables() {
        let s = schedule(&["08:00 day", "20:00 day"], false);
        assert!(!s.is_valid());
        assert!(!s.enabled);
    }

    #[test]
    fn test_invalid_entries_do_not_count() {
        let s = schedule(&["08:00 day", "bogus night"], false);
        assert!(!s.is_valid());
        assert_eq!(s.invalid_entries().count(), 1);
    }

    #[test]
    fn test_two_distinct_rulesets_valid() {
        let s = schedule(&["08:00 day", "20:00 night"], false);
        assert!(s.is_valid());
        assert!(s.enabled);
    }

    // ---- resolution, world time ----

    fn day_night() -> Schedule {
        schedule(&["08:00 day", "20:00 night"], false)
    }

    fn at(h: u32, m: u32) -> WeekTime {
        WeekTime::new(0, h, m, 0).unwrap()
    }

    #[test]
    fn test_resolves_most_recent_entry() {
        let s = day_night();
        let pick = s.resolve(at(21, 0), at(21, 0)).unwrap();
        assert_eq!(pick.ruleset, "night");
        let pick = s.resolve(at(9, 0), at(9, 0)).unwrap();
        assert_eq!(pick.ruleset, "day");
    }

    #[test]
    fn test_wraps_to_latest_before_first_entry() {
        let s = day_night();
        let pick = s.resolve(at(3, 0), at(3, 0)).unwrap();
        assert_eq!(pick.ruleset, "night");
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let s = day_night();
        let pick = s.resolve(at(8, 0), at(8, 0)).unwrap();
        assert_eq!(pick.ruleset, "day");
    }

    // ---- resolution, realtime ----

    #[test]
    fn test_realtime_weekly_positions() {
        // Sunday 10:00 vs Wednesday 10:00.
        let s = schedule(&["0.10:00 weekend", "3.10:00 midweek"], true);
        let monday_noon = WeekTime::new(1, 12, 0, 0).unwrap();
        let pick = s.resolve(monday_noon, at(12, 0)).unwrap();
        assert_eq!(pick.ruleset, "weekend");
        let thursday = WeekTime::new(4, 0, 0, 0).unwrap();
        let pick = s.resolve(thursday, at(0, 0)).unwrap();
        assert_eq!(pick.ruleset, "midweek");
    }

    #[test]
    fn test_realtime_daily_wins_when_more_recent() {
        let s = schedule(&["0.10:00 weekend", "*.08:00 daily"], true);
        // Monday 09:00: daily fired at Monday 08:00, weekly at Sunday 10:00.
        let monday = WeekTime::new(1, 9, 0, 0).unwrap();
        let pick = s.resolve(monday, at(9, 0)).unwrap();
        assert_eq!(pick.ruleset, "daily");
        // Sunday 11:00: weekly at 10:00 beats daily at 08:00.
        let sunday = WeekTime::new(0, 11, 0, 0).unwrap();
        let pick = s.resolve(sunday, at(11, 0)).unwrap();
        assert_eq!(pick.ruleset, "weekend");
    }

    #[test]
    fn test_realtime_wraps_before_any_weekly_fired() {
        // Weekly entry late in the week; early Monday nothing has fired.
        let s = schedule(&["5.10:00 weekend", "*.08:00 daily"], true);
        let monday_7 = WeekTime::new(1, 7, 0, 0).unwrap();
        let pick = s.resolve(monday_7, at(7, 0)).unwrap();
        // Wrap compares the latest daily (projected onto Monday) with the
        // latest weekly position; the weekly one is later in the week.
        assert_eq!(pick.ruleset, "weekend");
    }

    #[test]
    fn test_world_time_all_daily_resolves_nothing() {
        // Daily markers make no sense on the world clock; no pick is made.
        let s = schedule(&["*.08:00 day", "*.20:00 night"], false);
        assert!(s.resolve(at(21, 0), at(21, 0)).is_none());
    }
}
