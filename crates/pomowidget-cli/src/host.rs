//! Terminal implementations of the engine's capabilities.

use std::io::{Stdout, Write};

use pomowidget_core::storage::NotificationsConfig;
use pomowidget_core::{
    Capabilities, Config, CounterView, Database, Display, DisplayFrame, FrameQueue, Mode,
    Notifier, Permission, SqliteStore, SystemClock, TimerEngine,
};
use tracing::{debug, info};

/// An engine wired to the real clock and the on-disk store, plus the frame
/// queue the host loop drains.
pub struct Host {
    pub engine: TimerEngine,
    pub frames: FrameQueue,
    pub config: Config,
}

impl Host {
    /// Open the store and build an engine. The engine is loaded before
    /// returning.
    pub fn open(display: Box<dyn Display>) -> pomowidget_core::error::Result<Self> {
        let config = Config::load()?;
        let store = SqliteStore::new(Database::open()?, config.storage.state_key.clone());
        debug!(key = store.key(), "state store opened");
        let frames = FrameQueue::new();
        let mut engine = TimerEngine::new(
            config.default_durations(),
            Capabilities {
                clock: Box::new(SystemClock),
                store: Box::new(store),
                display,
                notifier: Box::new(TerminalNotifier::new(&config.notifications)),
                scheduler: Box::new(frames.clone()),
            },
        );
        engine.load();
        Ok(Self {
            engine,
            frames,
            config,
        })
    }
}

/// Redraws a single status line, on stdout unless given another writer.
pub struct TerminalDisplay<W: Write = Stdout> {
    out: W,
    last_line: String,
}

const BAR_WIDTH: usize = 20;

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            last_line: String::new(),
        }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    pub fn line(frame: &DisplayFrame) -> String {
        let filled = (frame.progress * BAR_WIDTH as f64).round() as usize;
        let tabs: Vec<String> = Mode::ALL
            .iter()
            .map(|m| {
                if frame.mode_active(*m) {
                    format!("[{}]", m.label())
                } else {
                    format!(" {} ", m.label())
                }
            })
            .collect();
        format!(
            "{} {} |{}{}| {}{}",
            tabs.join(""),
            frame.time_text,
            "#".repeat(filled.min(BAR_WIDTH)),
            ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            frame.start_label,
            if frame.reset_enabled { " (r: reset)" } else { "" },
        )
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn render(&mut self, frame: &DisplayFrame) {
        let line = TerminalDisplay::line(frame);
        if line == self.last_line {
            return;
        }
        let out = &mut self.out;
        if let Err(e) = write!(out, "\r\x1b[2K{line}").and_then(|()| out.flush()) {
            debug!(error = %e, "status line not written");
            return;
        }
        self.last_line = line;
    }

    fn focus_start_control(&mut self) {
        debug!("start control focused");
    }
}

/// Print the counter on its own line.
pub fn print_counter(view: &CounterView) {
    let sign = if view.negative { " (negative)" } else { "" };
    println!("\r\x1b[2Kcounter: {}{}", view.text, sign);
}

/// Writes completion messages to stderr, with an optional bell.
pub struct TerminalNotifier {
    permission: Permission,
    bell: bool,
}

impl TerminalNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            permission: if config.enabled {
                Permission::Granted
            } else {
                Permission::Denied
            },
            bell: config.bell,
        }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) {
        // The terminal never prompts; permission comes from config.
        debug!(permission = ?self.permission, "notification permission requested");
    }

    fn notify(&mut self, message: &str) {
        info!(text = message, "session finished");
        let bell = if self.bell { "\x07" } else { "" };
        eprintln!("\n{bell}{message}");
    }
}
