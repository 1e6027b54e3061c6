use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Phase};

/// Every accepted timer transition produces an Event.
/// Rejected transitions (start while running, pause while stopped, selecting
/// the current mode) produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_ms: u64,
        end_time_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        mode: Mode,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: Mode,
        /// Whether a notification was actually delivered.
        notified: bool,
        at: DateTime<Utc>,
    },
    /// Persisted state was read and reconciled at load.
    StateRestored {
        mode: Mode,
        phase: Phase,
        remaining_ms: u64,
        /// A running session ran out while nothing was watching.
        expired_while_unloaded: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        phase: Phase,
        remaining_ms: u64,
        total_ms: u64,
        end_time_ms: Option<u64>,
        progress: f64,
        time_text: String,
        at: DateTime<Utc>,
    },
}

/// Epoch milliseconds to a UTC timestamp, falling back to the epoch for values
/// chrono cannot represent.
pub fn timestamp(epoch_ms: u64) -> DateTime<Utc> {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::TimerPaused {
            mode: Mode::Focus,
            remaining_ms: 500_000,
            at: timestamp(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerPaused");
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["remaining_ms"], 500_000);
    }

    #[test]
    fn timestamp_converts_millis() {
        assert_eq!(timestamp(1_500).timestamp_millis(), 1_500);
        assert_eq!(timestamp(u64::MAX), DateTime::<Utc>::UNIX_EPOCH);
    }
}
