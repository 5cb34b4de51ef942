// Pose Recorder 🚀 AGPL-3.0 License

use std::path::PathBuf;

use clap::Parser;

use crate::config::SessionConfig;
use crate::error::{RecorderError, Result};
use crate::mode::SessionMode;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about = "Record an action or compare with an existing one", long_about = None)]
#[command(after_help = r"Options by command:
    record   --folder <NAME>   Action folder inside the recordings root (must exist)
    compare  --data <PATH>     Recording JSON to compare against

Examples:
    pose-recorder record --folder squat --source openpose_out/ --patient 'Zoë'
    pose-recorder compare --data recordings/squat/recording_20240309T070501.json --source openpose_out/
    pose-recorder record --folder squat --source openpose_out/ --max-frames 300 --min-conf 0.3")]
pub struct Cli {
    /// Session command: 'record' or 'compare'
    pub command: SessionMode,

    /// Name of an action folder inside of the recordings directory
    #[arg(long)]
    pub folder: Option<String>,

    /// Path to the JSON recording of an action
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Pose source: directory of OpenPose JSON frames, or a camera index
    #[arg(short, long, default_value = "0")]
    pub source: String,

    /// Patient name stored in a new recording
    #[arg(long, default_value = "")]
    pub patient: String,

    /// Recordings root directory (overrides the config file)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// JSON session configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Minimum keypoint confidence for angle derivation
    #[arg(long)]
    pub min_conf: Option<f32>,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

impl Cli {
    /// Check that the arguments the command needs were supplied.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::MissingArgumentError`] for `record` without
    /// `--folder` or `compare` without `--data`.
    pub fn check_required(&self) -> Result<()> {
        if self.command.saves() && self.folder.as_deref().is_none_or(str::is_empty) {
            return Err(RecorderError::MissingArgumentError(
                "--folder is required to save this recording as a JSON file".to_string(),
            ));
        }
        if self.command.needs_reference() && self.data.is_none() {
            return Err(RecorderError::MissingArgumentError(
                "--data is required for loading a recording from a JSON file".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the session configuration: config file (or defaults) with command-line
    /// overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ConfigError`] if the config file is unreadable or the
    /// resulting configuration is invalid.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(root) = &self.root {
            config = config.with_recordings_root(root.clone());
        }
        if let Some(max) = self.max_frames {
            config = config.with_max_frames(max);
        }
        if let Some(conf) = self.min_conf {
            config = config.with_min_confidence(conf);
        }
        config.validate()?;
        Ok(config)
    }
}
