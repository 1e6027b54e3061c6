mod engine;
mod frame;
mod mode;
mod state;

pub use engine::{Capabilities, TimerEngine};
pub use frame::{FrameHandle, FrameQueue, FrameScheduler};
pub use mode::{minutes_to_ms, Durations, Mode};
pub use state::{PersistedDurations, PersistedState, Phase, TimerState};
