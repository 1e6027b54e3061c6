//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads: while running it asks the host for the next display frame
//! and recomputes the remaining time from the stored end time whenever that
//! frame arrives, so dropped or late frames never cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Expired) -> Running ...
//!   any  -> reset / set_mode -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default(), capabilities);
//! engine.load();
//! engine.start();
//! // In the host's frame loop:
//! for handle in frames.take_due() {
//!     engine.on_frame(handle); // Returns Some(Event) when the session ends
//! }
//! ```

use tracing::{debug, warn};

use super::frame::{FrameHandle, FrameScheduler};
use super::mode::{minutes_to_ms, Durations, Mode};
use super::state::{Phase, PersistedState, TimerState};
use crate::clock::Clock;
use crate::display::{Display, DisplayFrame};
use crate::events::{timestamp, Event};
use crate::notify::{Notifier, Permission};
use crate::storage::StateStore;

/// Everything the engine talks to outside itself.
pub struct Capabilities {
    pub clock: Box<dyn Clock>,
    pub store: Box<dyn StateStore>,
    pub display: Box<dyn Display>,
    pub notifier: Box<dyn Notifier>,
    pub scheduler: Box<dyn FrameScheduler>,
}

/// Core timer engine.
///
/// Every accepted command mutates the state, re-renders, and writes the state
/// to the store. Commands that are not valid in the current phase return
/// `None` and touch nothing.
pub struct TimerEngine {
    state: TimerState,
    defaults: Durations,
    pending_frame: Option<FrameHandle>,
    caps: Capabilities,
}

impl TimerEngine {
    /// Create an idle engine in Focus mode with the given default durations.
    ///
    /// Nothing is read, rendered or scheduled until [`TimerEngine::load`].
    pub fn new(defaults: Durations, caps: Capabilities) -> Self {
        Self {
            state: TimerState::new(defaults),
            defaults,
            pending_frame: None,
            caps,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining
    }

    pub fn total_ms(&self) -> u64 {
        self.state.duration()
    }

    /// The frame callback currently awaited, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Display values derived from the current state.
    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::from_state(&self.state)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let frame = self.frame();
        Event::StateSnapshot {
            mode: self.state.mode,
            phase: self.state.phase(),
            remaining_ms: self.state.remaining,
            total_ms: self.state.duration(),
            end_time_ms: self.state.end_time,
            progress: frame.progress,
            time_text: frame.time_text,
            at: timestamp(self.now()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Read persisted state, merge it over the defaults and reconcile it with
    /// the clock. Resumes the frame task if the session is still running.
    ///
    /// A session that ran out while nothing was loaded comes back expired,
    /// without a notification.
    pub fn load(&mut self) -> Event {
        self.cancel_frame();
        let now = self.now();
        let defaults = TimerState::new(self.defaults);

        let blob = match self.caps.store.get() {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "could not read persisted timer state, using defaults");
                None
            }
        };
        let persisted = blob.as_deref().and_then(|b| {
            let parsed = PersistedState::parse(b);
            if parsed.is_none() {
                debug!("discarding malformed persisted timer state");
            }
            parsed
        });

        let merged = match persisted {
            Some(p) => p.merge_over(defaults),
            None => defaults,
        };
        let was_running = merged.running && merged.end_time.is_some();
        self.state = merged.reconcile(now);
        let expired_while_unloaded = was_running && !self.state.running;

        debug!(
            mode = %self.state.mode,
            running = self.state.running,
            remaining_ms = self.state.remaining,
            expired_while_unloaded,
            "timer state restored"
        );

        if self.state.running {
            self.arm_frame();
        }
        self.render();

        Event::StateRestored {
            mode: self.state.mode,
            phase: self.state.phase(),
            remaining_ms: self.state.remaining,
            expired_while_unloaded,
            at: timestamp(now),
        }
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        let now = self.now();
        let end_time = now.saturating_add(self.state.remaining);
        self.state.end_time = Some(end_time);
        self.state.running = true;

        if self.caps.notifier.permission() == Permission::Default {
            self.caps.notifier.request_permission();
        }

        debug!(mode = %self.state.mode, remaining_ms = self.state.remaining, "timer started");
        self.arm_frame();
        self.persist();
        self.render();
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_ms: self.state.remaining,
            end_time_ms: end_time,
            at: timestamp(now),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.cancel_frame();
        let now = self.now();
        if let Some(end) = self.state.end_time.take() {
            self.state.remaining = self.state.remaining_at(end, now);
        }
        self.state.running = false;

        debug!(remaining_ms = self.state.remaining, "timer paused");
        self.persist();
        self.render();
        Some(Event::TimerPaused {
            mode: self.state.mode,
            remaining_ms: self.state.remaining,
            at: timestamp(now),
        })
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Always permitted, whatever the phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.cancel_frame();
        self.state.rewind();

        debug!(mode = %self.state.mode, "timer reset");
        self.persist();
        self.render();
        Some(Event::TimerReset {
            mode: self.state.mode,
            remaining_ms: self.state.remaining,
            at: timestamp(self.now()),
        })
    }

    pub fn set_mode(&mut self, mode: Mode) -> Option<Event> {
        if mode == self.state.mode {
            return None;
        }
        self.cancel_frame();
        let from = self.state.mode;
        self.state.mode = mode;
        self.state.rewind();

        debug!(%from, to = %mode, "mode changed");
        self.persist();
        self.render();
        self.caps.display.focus_start_control();
        Some(Event::ModeChanged {
            from,
            to: mode,
            remaining_ms: self.state.remaining,
            at: timestamp(self.now()),
        })
    }

    /// Change the session length for `mode`. Changing the active mode also
    /// resets the timer to the new length.
    pub fn set_duration(&mut self, mode: Mode, minutes: u32) -> Option<Event> {
        let duration_ms = minutes_to_ms(minutes);
        self.state.durations.set(mode, duration_ms);

        debug!(%mode, duration_ms, "duration changed");
        if mode == self.state.mode {
            self.reset();
        } else {
            self.persist();
            self.render();
        }
        Some(Event::DurationChanged {
            mode,
            duration_ms,
            at: timestamp(self.now()),
        })
    }

    /// Recompute the remaining time from the end time.
    ///
    /// Re-arms the frame task while time is left. Returns
    /// `Some(Event::TimerCompleted)` when the session reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        let end = self.state.end_time?;
        let now = self.now();
        self.state.remaining = self.state.remaining_at(end, now);

        if self.state.remaining > 0 {
            self.arm_frame();
            self.render();
            return None;
        }

        self.cancel_frame();
        self.state.running = false;
        self.state.end_time = None;
        self.persist();
        let notified = self.notify_completion();
        self.render();
        Some(Event::TimerCompleted {
            mode: self.state.mode,
            notified,
            at: timestamp(now),
        })
    }

    /// Frame callback from the host scheduler.
    ///
    /// Handles other than the one currently awaited are stale and ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<Event> {
        if self.pending_frame != Some(handle) {
            debug!(?handle, "ignoring stale frame");
            return None;
        }
        self.pending_frame = None;
        self.tick()
    }

    /// Drop the persisted blob and go back to the configured defaults.
    pub fn clear_storage(&mut self) -> Option<Event> {
        self.cancel_frame();
        if let Err(e) = self.caps.store.clear() {
            warn!(error = %e, "failed to clear persisted timer state");
        }
        self.state = TimerState::new(self.defaults);
        self.render();
        Some(Event::TimerReset {
            mode: self.state.mode,
            remaining_ms: self.state.remaining,
            at: timestamp(self.now()),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&self) -> u64 {
        self.caps.clock.now_ms()
    }

    fn arm_frame(&mut self) {
        self.cancel_frame();
        self.pending_frame = Some(self.caps.scheduler.request_frame());
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.caps.scheduler.cancel_frame(handle);
        }
    }

    fn persist(&mut self) {
        match self.state.to_blob() {
            Ok(blob) => {
                if let Err(e) = self.caps.store.set(&blob) {
                    warn!(error = %e, "failed to persist timer state");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize timer state"),
        }
    }

    fn render(&mut self) {
        let frame = DisplayFrame::from_state(&self.state);
        self.caps.display.render(&frame);
    }

    fn notify_completion(&mut self) -> bool {
        let message = self.state.mode.completion_message();
        match self.caps.notifier.permission() {
            Permission::Granted => {
                self.caps.notifier.notify(message);
                true
            }
            permission => {
                debug!(?permission, text = message, "completion notification skipped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::display::FrameLog;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use crate::timer::FrameQueue;

    const T0: u64 = 1_700_000_000_000;

    struct Harness {
        engine: TimerEngine,
        clock: ManualClock,
        store: MemoryStore,
        display: FrameLog,
        notifier: RecordingNotifier,
        frames: FrameQueue,
    }

    fn harness_with(store: MemoryStore, permission: Permission) -> Harness {
        let clock = ManualClock::at(T0);
        let display = FrameLog::new();
        let notifier = RecordingNotifier::with_permission(permission);
        let frames = FrameQueue::new();
        let engine = TimerEngine::new(
            Durations::default(),
            Capabilities {
                clock: Box::new(clock.clone()),
                store: Box::new(store.clone()),
                display: Box::new(display.clone()),
                notifier: Box::new(notifier.clone()),
                scheduler: Box::new(frames.clone()),
            },
        );
        Harness {
            engine,
            clock,
            store,
            display,
            notifier,
            frames,
        }
    }

    fn harness() -> Harness {
        let mut h = harness_with(MemoryStore::new(), Permission::Granted);
        h.engine.load();
        h
    }

    #[test]
    fn start_pause_resume() {
        let mut h = harness();
        assert_eq!(h.engine.phase(), Phase::Idle);

        assert!(h.engine.start().is_some());
        assert_eq!(h.engine.phase(), Phase::Running);
        assert_eq!(h.engine.state().end_time, Some(T0 + 1_500_000));

        h.clock.advance(1_000);
        assert!(h.engine.pause().is_some());
        assert_eq!(h.engine.phase(), Phase::Paused);
        assert_eq!(h.engine.remaining_ms(), 1_499_000);

        assert!(h.engine.start().is_some());
        assert_eq!(h.engine.phase(), Phase::Running);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let mut h = harness();
        h.engine.start();
        let writes = h.store.writes();
        h.clock.advance(10);
        assert!(h.engine.start().is_none());
        assert_eq!(h.store.writes(), writes);
        assert_eq!(h.engine.state().end_time, Some(T0 + 1_500_000));
    }

    #[test]
    fn pause_when_stopped_is_ignored() {
        let mut h = harness();
        assert!(h.engine.pause().is_none());
        assert_eq!(h.store.writes(), 0);
    }

    #[test]
    fn only_one_frame_pending_while_running() {
        let mut h = harness();
        h.engine.start();
        assert_eq!(h.frames.pending(), 1);
        h.engine.tick();
        h.engine.tick();
        assert_eq!(h.frames.pending(), 1);
    }

    #[test]
    fn exit_transitions_cancel_the_pending_frame() {
        let mut h = harness();
        h.engine.start();
        h.engine.pause();
        assert!(h.frames.is_idle());
        assert!(h.engine.pending_frame().is_none());

        h.engine.start();
        h.engine.reset();
        assert!(h.frames.is_idle());

        h.engine.start();
        h.engine.set_mode(Mode::LongBreak);
        assert!(h.frames.is_idle());
        assert_eq!(h.frames.cancelled(), 3);
    }

    #[test]
    fn stale_frame_does_not_touch_state() {
        let mut h = harness();
        h.engine.start();
        let stale = h.engine.pending_frame().unwrap();
        h.clock.advance(5_000);
        h.engine.pause();
        h.clock.advance(60_000);
        assert!(h.engine.on_frame(stale).is_none());
        assert_eq!(h.engine.remaining_ms(), 1_495_000);
        assert!(!h.engine.is_running());
    }

    #[test]
    fn frames_drive_countdown() {
        let mut h = harness();
        h.engine.start();
        h.clock.advance(16);
        for handle in h.frames.take_due() {
            h.engine.on_frame(handle);
        }
        assert_eq!(h.engine.remaining_ms(), 1_500_000 - 16);
        assert_eq!(h.frames.pending(), 1);
        assert_eq!(h.display.last().unwrap().time_text, "24:59");
    }

    #[test]
    fn focus_completion_notifies() {
        let mut h = harness();
        h.engine.start();
        h.clock.advance(1_500_000);
        let event = h.engine.tick();
        assert!(matches!(
            event,
            Some(Event::TimerCompleted {
                mode: Mode::Focus,
                notified: true,
                ..
            })
        ));
        assert_eq!(h.engine.remaining_ms(), 0);
        assert!(!h.engine.is_running());
        assert!(h.engine.state().end_time.is_none());
        assert_eq!(h.engine.phase(), Phase::Expired);
        assert_eq!(h.notifier.messages(), vec!["Focus session complete"]);
        assert!(h.frames.is_idle());
    }

    #[test]
    fn break_completion_message() {
        let mut h = harness();
        h.engine.set_mode(Mode::ShortBreak);
        h.engine.start();
        h.clock.advance(400_000);
        h.engine.tick();
        assert_eq!(h.notifier.messages(), vec!["Break finished"]);
    }

    #[test]
    fn completion_without_permission_is_silent() {
        let mut h = harness_with(MemoryStore::new(), Permission::Denied);
        h.engine.load();
        h.engine.start();
        h.clock.advance(2_000_000);
        let event = h.engine.tick();
        assert!(matches!(
            event,
            Some(Event::TimerCompleted { notified: false, .. })
        ));
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.notifier.permission_requests(), 0);
    }

    #[test]
    fn start_requests_undetermined_permission() {
        let mut h = harness_with(MemoryStore::new(), Permission::Default);
        h.engine.load();
        h.engine.start();
        assert_eq!(h.notifier.permission_requests(), 1);
        h.engine.pause();
        h.engine.start();
        assert_eq!(h.notifier.permission_requests(), 2);
    }

    #[test]
    fn permission_granted_after_request_is_used_at_completion() {
        let store = MemoryStore::new();
        let mut h = harness_with(store, Permission::Default);
        let notifier = RecordingNotifier::with_permission(Permission::Default).granting();
        h.engine.caps.notifier = Box::new(notifier.clone());
        h.engine.load();
        h.engine.start();
        assert_eq!(notifier.permission(), Permission::Granted);
        h.clock.advance(1_500_000);
        h.engine.tick();
        assert_eq!(notifier.messages(), vec!["Focus session complete"]);
    }

    #[test]
    fn set_mode_same_mode_is_noop() {
        let mut h = harness();
        let rendered = h.display.len();
        assert!(h.engine.set_mode(Mode::Focus).is_none());
        assert_eq!(h.store.writes(), 0);
        assert_eq!(h.display.len(), rendered);
        assert_eq!(h.display.focus_requests(), 0);
    }

    #[test]
    fn set_mode_resets_and_focuses_start() {
        let mut h = harness();
        h.engine.start();
        h.clock.advance(10_000);
        h.engine.set_mode(Mode::LongBreak);
        assert_eq!(h.engine.mode(), Mode::LongBreak);
        assert_eq!(h.engine.remaining_ms(), 900_000);
        assert!(!h.engine.is_running());
        assert_eq!(h.display.focus_requests(), 1);
        assert!(h.display.last().unwrap().mode_active(Mode::LongBreak));
    }

    #[test]
    fn set_duration_of_active_mode_resets() {
        let mut h = harness();
        h.engine.start();
        h.clock.advance(10_000);
        h.engine.set_duration(Mode::Focus, 50);
        assert_eq!(h.engine.remaining_ms(), 3_000_000);
        assert!(!h.engine.is_running());
        assert!(h.frames.is_idle());
    }

    #[test]
    fn set_duration_of_other_mode_keeps_running() {
        let mut h = harness();
        h.engine.start();
        let writes = h.store.writes();
        h.engine.set_duration(Mode::ShortBreak, 10);
        assert!(h.engine.is_running());
        assert_eq!(h.engine.state().durations.short, 600_000);
        assert_eq!(h.store.writes(), writes + 1);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut h = harness();
        h.engine.set_duration(Mode::Focus, 0);
        assert_eq!(h.engine.remaining_ms(), 0);
        assert_eq!(h.engine.frame().progress, 0.0);
        h.engine.start();
        assert!(h.engine.tick().is_some());
        assert!(!h.engine.is_running());
    }

    #[test]
    fn storage_failures_do_not_stop_the_timer() {
        let store = MemoryStore::new();
        store.fail();
        let mut h = harness_with(store, Permission::Granted);
        h.engine.load();
        assert!(h.engine.start().is_some());
        h.clock.advance(1_500_000);
        assert!(h.engine.tick().is_some());
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[test]
    fn clear_storage_drops_blob() {
        let mut h = harness();
        h.engine.set_duration(Mode::Focus, 40);
        assert!(h.store.blob().is_some());
        h.engine.clear_storage();
        assert!(h.store.blob().is_none());
        assert_eq!(h.engine.remaining_ms(), 1_500_000);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let h = harness();
        match h.engine.snapshot() {
            Event::StateSnapshot {
                phase,
                remaining_ms,
                time_text,
                ..
            } => {
                assert_eq!(phase, Phase::Idle);
                assert_eq!(remaining_ms, 1_500_000);
                assert_eq!(time_text, "25:00");
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
