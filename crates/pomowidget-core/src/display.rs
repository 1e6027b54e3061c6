//! What the engine pushes to whatever draws it.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::timer::{Mode, TimerState};

/// One rendered view of the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub mode: Mode,
    /// `MM:SS` of the remaining time.
    pub time_text: String,
    /// Remaining over full duration, in `[0, 1]`.
    pub progress: f64,
    pub running: bool,
    pub start_label: String,
    pub reset_enabled: bool,
}

impl DisplayFrame {
    pub fn from_state(state: &TimerState) -> Self {
        Self {
            mode: state.mode,
            time_text: format_mmss(state.remaining),
            progress: progress_fraction(state.remaining, state.duration()),
            running: state.running,
            start_label: if state.running { "Pause" } else { "Start" }.to_string(),
            reset_enabled: !state.at_full_duration(),
        }
    }

    /// Whether the selector for `mode` should be styled active.
    pub fn mode_active(&self, mode: Mode) -> bool {
        self.mode == mode
    }
}

/// The rendering surface.
pub trait Display {
    fn render(&mut self, frame: &DisplayFrame);

    /// Move input focus to the start/pause control.
    fn focus_start_control(&mut self) {}
}

/// Keeps every frame it is given. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    frames: Rc<RefCell<Vec<DisplayFrame>>>,
    focus_requests: Rc<RefCell<usize>>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<DisplayFrame> {
        self.frames.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn focus_requests(&self) -> usize {
        *self.focus_requests.borrow()
    }
}

impl Display for FrameLog {
    fn render(&mut self, frame: &DisplayFrame) {
        self.frames.borrow_mut().push(frame.clone());
    }

    fn focus_start_control(&mut self) {
        *self.focus_requests.borrow_mut() += 1;
    }
}

/// Format milliseconds as `MM:SS`. Minutes are not wrapped at 60.
pub fn format_mmss(ms: u64) -> String {
    let total_secs = ms / 1000;
    let m = total_secs / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}", m, s)
}

/// `remaining / duration`, clamped to `[0, 1]`; zero for an empty duration.
pub fn progress_fraction(remaining: u64, duration: u64) -> f64 {
    if duration == 0 {
        return 0.0;
    }
    (remaining as f64 / duration as f64).clamp(0.0, 1.0)
}
