// Pose Recorder 🚀 AGPL-3.0 License

//! Error types for the pose recorder.

use std::fmt;

/// Result type alias for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Main error type for the pose recorder.
#[derive(Debug)]
pub enum RecorderError {
    /// A frame did not contain exactly one subject. Holds the subject count.
    MultiSubjectError(usize),
    /// A required command-line argument was not supplied.
    MissingArgumentError(String),
    /// A recording could not be read or parsed.
    FileReadError(String),
    /// A recording could not be written.
    FileWriteError(String),
    /// The pose source (camera or replay directory) is unavailable.
    CaptureDeviceError(String),
    /// Keypoint data has the wrong shape or joint count.
    KeypointError(String),
    /// Joint angles could not be derived from keypoints.
    AngleError(String),
    /// Operation not allowed in the sequence's current lifecycle state.
    SequenceStateError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultiSubjectError(n) => write!(
                f,
                "Multi-subject error: expected exactly 1 person in the frame, found {n}"
            ),
            Self::MissingArgumentError(msg) => write!(f, "Missing argument: {msg}"),
            Self::FileReadError(msg) => write!(f, "File read error: {msg}"),
            Self::FileWriteError(msg) => write!(f, "File write error: {msg}"),
            Self::CaptureDeviceError(msg) => write!(f, "Capture device error: {msg}"),
            Self::KeypointError(msg) => write!(f, "Keypoint error: {msg}"),
            Self::AngleError(msg) => write!(f, "Angle error: {msg}"),
            Self::SequenceStateError(msg) => write!(f, "Sequence state error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for RecorderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
