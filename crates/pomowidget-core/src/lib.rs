//! # Pomowidget Core Library
//!
//! This library provides the logic behind the pomowidget: a Pomodoro countdown
//! timer with three modes and a small counter beside it. Hosts (the terminal
//! CLI, or anything else that can draw) inject the outside world as traits and
//! drive the timer with display frames.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine. While running it keeps
//!   an absolute end time and recomputes the remaining time on every frame
//! - **Storage**: A single JSON blob in a key-value store, reconciled against
//!   the clock on load; TOML-based configuration
//! - **Input**: Button activations and keyboard shortcuts routed to the counter
//!   and the timer
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Widget`]: Input routing for counter and timer
//! - [`StateStore`]: Persistence capability, with [`SqliteStore`] and
//!   [`MemoryStore`] implementations
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod counter;
pub mod display;
pub mod error;
pub mod events;
pub mod input;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::{Counter, CounterView};
pub use display::{Display, DisplayFrame, FrameLog};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use input::{Input, Shortcut, Widget};
pub use notify::{Notifier, Permission, RecordingNotifier};
pub use storage::{Config, Database, MemoryStore, SqliteStore, StateStore};
pub use timer::{
    Capabilities, Durations, FrameHandle, FrameQueue, FrameScheduler, Mode, Phase,
    PersistedDurations, PersistedState, TimerEngine, TimerState,
};
