//! tokio-driven frame loops.

use std::time::Duration;

use pomowidget_core::{Event, FrameQueue, TimerEngine};
use tokio::time::MissedTickBehavior;

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn ticker(interval_ms: u64) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Hand every due frame to the engine. Returns the completion event if one
/// of them ended the session.
pub fn pump(engine: &mut TimerEngine, frames: &FrameQueue) -> Option<Event> {
    let mut completed = None;
    for handle in frames.take_due() {
        if let Some(event) = engine.on_frame(handle) {
            completed = Some(event);
        }
    }
    completed
}

/// Run frames until the engine stops running or Ctrl-C arrives.
pub async fn until_stopped(
    engine: &mut TimerEngine,
    frames: &FrameQueue,
    interval_ms: u64,
) -> Option<Event> {
    let mut ticker = ticker(interval_ms);
    while engine.is_running() {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = pump(engine, frames) {
                    return Some(event);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted, leaving timer running");
                return None;
            }
        }
    }
    None
}
