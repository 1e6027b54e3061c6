use clap::Subcommand;
use pomowidget_core::{Display, Event, FrameLog, Mode};

use crate::frames;
use crate::host::{Host, TerminalDisplay};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and rewind to the full duration of the current mode
    Reset,
    /// Switch mode (focus, short, long)
    Mode {
        mode: Mode,
    },
    /// Set the length of a mode in minutes
    Duration {
        mode: Mode,
        minutes: u32,
    },
    /// Print current timer state as JSON
    Status,
    /// Follow a running countdown until it finishes
    Watch,
    /// Forget the persisted timer state
    Clear,
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let display: Box<dyn Display> = match action {
        TimerAction::Watch => Box::new(TerminalDisplay::new()),
        _ => Box::new(FrameLog::new()),
    };
    let mut host = Host::open(display)?;
    let engine = &mut host.engine;

    let event = match action {
        TimerAction::Start => engine.start(),
        TimerAction::Pause => engine.pause(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Mode { mode } => engine.set_mode(mode),
        TimerAction::Duration { mode, minutes } => engine.set_duration(mode, minutes),
        TimerAction::Clear => engine.clear_storage(),
        TimerAction::Status => {
            let completed = engine.tick();
            print_event(&engine.snapshot())?;
            if let Some(event) = completed {
                print_event(&event)?;
            }
            return Ok(());
        }
        TimerAction::Watch => return watch(&mut host),
    };

    match event {
        Some(event) => print_event(&event)?,
        // Not valid right now; show where things stand instead.
        None => print_event(&engine.snapshot())?,
    }
    Ok(())
}

fn watch(host: &mut Host) -> Result<(), Box<dyn std::error::Error>> {
    if !host.engine.is_running() {
        println!();
        print_event(&host.engine.snapshot())?;
        return Ok(());
    }

    let interval = host.config.ui.frame_interval_ms;
    let completed = frames::runtime()?.block_on(frames::until_stopped(
        &mut host.engine,
        &host.frames,
        interval,
    ));
    println!();
    if let Some(event) = completed {
        print_event(&event)?;
    }
    Ok(())
}
