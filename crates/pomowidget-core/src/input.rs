//! Raw input routing for the whole widget.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::counter::Counter;
use crate::events::Event;
use crate::timer::{Mode, TimerEngine};

/// A discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    CounterIncrement,
    CounterDecrement,
    CounterReset,
    ToggleStartPause,
    Reset,
    SelectMode { mode: Mode },
    SelectDuration { mode: Mode, minutes: u32 },
    /// A key press. `in_text_field` is true when focus sits in a text entry,
    /// where shortcuts must not fire.
    Key { key: char, in_text_field: bool },
}

/// What a key does when shortcuts are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleStartPause,
    SelectMode(Mode),
}

/// Map a key to its shortcut. Letters match either case.
pub fn shortcut_for(key: char) -> Option<Shortcut> {
    match key.to_ascii_lowercase() {
        ' ' => Some(Shortcut::ToggleStartPause),
        'f' => Some(Shortcut::SelectMode(Mode::Focus)),
        'b' => Some(Shortcut::SelectMode(Mode::ShortBreak)),
        'l' => Some(Shortcut::SelectMode(Mode::LongBreak)),
        _ => None,
    }
}

/// The counter and the timer behind one input surface.
pub struct Widget {
    pub counter: Counter,
    pub timer: TimerEngine,
}

impl Widget {
    pub fn new(counter: Counter, timer: TimerEngine) -> Self {
        Self { counter, timer }
    }

    /// Route one input. Returns the timer event it produced, if any.
    pub fn handle(&mut self, input: Input) -> Option<Event> {
        match input {
            Input::CounterIncrement => {
                self.counter.increment();
                None
            }
            Input::CounterDecrement => {
                self.counter.decrement();
                None
            }
            Input::CounterReset => {
                self.counter.reset();
                None
            }
            Input::ToggleStartPause => self.timer.toggle(),
            Input::Reset => self.timer.reset(),
            Input::SelectMode { mode } => self.timer.set_mode(mode),
            Input::SelectDuration { mode, minutes } => self.timer.set_duration(mode, minutes),
            Input::Key { key, in_text_field } => {
                if in_text_field {
                    debug!(?key, "shortcut suppressed inside text field");
                    return None;
                }
                match shortcut_for(key)? {
                    Shortcut::ToggleStartPause => self.timer.toggle(),
                    Shortcut::SelectMode(mode) => self.timer.set_mode(mode),
                }
            }
        }
    }
}
