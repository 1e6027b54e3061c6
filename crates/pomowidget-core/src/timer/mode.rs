use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: u64 = 60 * 1000;

/// Which kind of session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "focus")]
    Focus,
    #[serde(rename = "short")]
    ShortBreak,
    #[serde(rename = "long")]
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    /// Stable key used in the persisted blob and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short",
            Mode::LongBreak => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Focus)
    }

    /// Message sent when a session of this mode runs out.
    pub fn completion_message(self) -> &'static str {
        if self.is_break() {
            "Break finished"
        } else {
            "Focus session complete"
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "focus" | "f" => Ok(Mode::Focus),
            "short" | "short-break" | "b" => Ok(Mode::ShortBreak),
            "long" | "long-break" | "l" => Ok(Mode::LongBreak),
            other => Err(format!("unknown mode '{other}' (expected focus, short or long)")),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-mode session length in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus: u64,
    pub short: u64,
    pub long: u64,
}

impl Durations {
    pub fn from_minutes(focus: u32, short: u32, long: u32) -> Self {
        Self {
            focus: minutes_to_ms(focus),
            short: minutes_to_ms(short),
            long: minutes_to_ms(long),
        }
    }

    pub fn get(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short,
            Mode::LongBreak => self.long,
        }
    }

    pub fn set(&mut self, mode: Mode, ms: u64) {
        match mode {
            Mode::Focus => self.focus = ms,
            Mode::ShortBreak => self.short = ms,
            Mode::LongBreak => self.long = ms,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15)
    }
}

/// Minutes to milliseconds, saturating on overflow.
pub fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes).saturating_mul(MS_PER_MINUTE)
}
