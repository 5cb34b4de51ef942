// Pose Recorder 🚀 AGPL-3.0 License

//! Session modes.

use std::fmt;
use std::str::FromStr;

/// What a session does with the captured sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Capture a sequence and save it as a new recording.
    Record,
    /// Load a reference recording, capture a sequence, and compare the two.
    Compare,
}

impl SessionMode {
    /// Returns the command name for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Compare => "compare",
        }
    }

    /// Returns whether this mode writes a recording.
    #[must_use]
    pub const fn saves(&self) -> bool {
        matches!(self, Self::Record)
    }

    /// Returns whether this mode needs a reference recording.
    #[must_use]
    pub const fn needs_reference(&self) -> bool {
        matches!(self, Self::Compare)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "record" | "rec" => Ok(Self::Record),
            "compare" | "cmp" => Ok(Self::Compare),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid mode string.
#[derive(Debug, Clone)]
pub struct ModeParseError(String);

impl fmt::Display for ModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid command '{}', expected one of: record, compare",
            self.0
        )
    }
}

impl std::error::Error for ModeParseError {}
