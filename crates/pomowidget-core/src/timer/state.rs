//! The timer state record and its persisted form.
//!
//! `TimerState` is what gets written to the store after every mutation. Reading
//! goes through [`PersistedState`], whose fields are all optional so that a
//! blob written by an older or newer build merges over the defaults instead of
//! being rejected.

use serde::{Deserialize, Serialize};

use super::mode::{Durations, Mode};

/// The single mutable record owned by the timer engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub durations: Durations,
    /// Milliseconds left. Authoritative only while not running.
    pub remaining: u64,
    pub running: bool,
    /// Epoch milliseconds at which a running session reaches zero.
    #[serde(rename = "endTime")]
    pub end_time: Option<u64>,
}

/// Coarse lifecycle position, derived from a [`TimerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero on its own and nothing has happened since.
    Expired,
}

impl TimerState {
    pub fn new(durations: Durations) -> Self {
        Self {
            mode: Mode::Focus,
            durations,
            remaining: durations.get(Mode::Focus),
            running: false,
            end_time: None,
        }
    }

    pub fn duration(&self) -> u64 {
        self.durations.get(self.mode)
    }

    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else if self.remaining == self.duration() {
            Phase::Idle
        } else if self.remaining == 0 {
            Phase::Expired
        } else {
            Phase::Paused
        }
    }

    /// True when the timer sits at full duration and is not running.
    pub fn at_full_duration(&self) -> bool {
        !self.running && self.remaining == self.duration()
    }

    /// Milliseconds left at `now_ms` according to the end time, floored at
    /// zero and capped at the active duration.
    pub fn remaining_at(&self, end_time: u64, now_ms: u64) -> u64 {
        end_time.saturating_sub(now_ms).min(self.duration())
    }

    /// Back to full duration for the active mode, not running.
    pub(crate) fn rewind(&mut self) {
        self.running = false;
        self.end_time = None;
        self.remaining = self.duration();
    }

    /// Serialize to the JSON blob handed to the state store.
    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Bring a merged record in line with the clock.
    ///
    /// A running record with an end time gets its remaining time recomputed,
    /// and if that is zero it is treated as having expired while nothing was
    /// watching. A stopped record always snaps back to full duration, which
    /// drops any partially elapsed paused session.
    pub fn reconcile(mut self, now_ms: u64) -> Self {
        match (self.running, self.end_time) {
            (true, Some(end)) => {
                self.remaining = self.remaining_at(end, now_ms);
                if self.remaining == 0 {
                    self.running = false;
                    self.end_time = None;
                }
            }
            _ => self.rewind(),
        }
        self
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

/// A possibly partial record read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistedState {
    pub mode: Option<Mode>,
    pub durations: Option<PersistedDurations>,
    pub remaining: Option<u64>,
    pub running: Option<bool>,
    #[serde(rename = "endTime")]
    pub end_time: Option<u64>,
}

/// Per-mode lengths as stored. A mode left out keeps whatever the engine
/// was configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PersistedDurations {
    pub focus: Option<u64>,
    pub short: Option<u64>,
    pub long: Option<u64>,
}

impl PersistedDurations {
    pub fn merge_over(self, defaults: Durations) -> Durations {
        Durations {
            focus: self.focus.unwrap_or(defaults.focus),
            short: self.short.unwrap_or(defaults.short),
            long: self.long.unwrap_or(defaults.long),
        }
    }
}

impl PersistedState {
    /// Parse a stored blob. Anything that is not a JSON object with
    /// well-typed known fields yields `None`.
    pub fn parse(blob: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(blob).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Shallow merge over `defaults`: fields present here win.
    pub fn merge_over(self, defaults: TimerState) -> TimerState {
        TimerState {
            mode: self.mode.unwrap_or(defaults.mode),
            durations: match self.durations {
                Some(d) => d.merge_over(defaults.durations),
                None => defaults.durations,
            },
            remaining: self.remaining.unwrap_or(defaults.remaining),
            running: self.running.unwrap_or(defaults.running),
            end_time: self.end_time.or(defaults.end_time),
        }
    }
}
