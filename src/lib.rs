// Pose Recorder 🚀 AGPL-3.0 License

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Pose Recorder
//!
//! Records a time-ordered sequence of human body poses (skeletons) from a pose
//! estimation engine, persists it as a JSON recording, and later loads a recording
//! back as a reference for a newly captured sequence.
//!
//! ## Features
//!
//! - **Lossless Recordings** - Save/load round-trips angles, subject names (including
//!   non-ASCII), and unknown fields exactly
//! - **Single-Subject Capture** - Frames with zero or several people are rejected
//! - **Pluggable Geometry** - Joint angles come from an injected [`AngleDeriver`]
//! - **OpenPose Replay** - Replays directories written by OpenPose `--write_json`
//! - **Comparison Seam** - Plug a scoring algorithm in through [`Comparator`]
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use pose_recorder::{Body25AngleDeriver, OpenPoseJsonSource, PoseSource, SkeletonSequence};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let deriver = Body25AngleDeriver::default();
//!     let mut source = OpenPoseJsonSource::open("openpose_out/")?;
//!
//!     let mut sequence = SkeletonSequence::new();
//!     while let Some(frame) = source.next_frame() {
//!         sequence.add(&frame?, &deriver)?;
//!     }
//!
//!     let path = sequence.save_to_file("recordings/squat", "Zoë")?;
//!     let reloaded = SkeletonSequence::load_from_file(&path)?;
//!     assert_eq!(reloaded.len(), sequence.len());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Record a session into recordings/squat/recording_<timestamp>.json
//! pose-recorder record --folder squat --source openpose_out/
//!
//! # Compare a new session against an existing recording
//! pose-recorder compare --data recordings/squat/recording_20240309T070501.json --source openpose_out/
//! ```
//!
//! **CLI Options:**
//!
//! | Option | Description | Default |
//! |--------|-------------|---------|
//! | `--folder` | Action folder inside the recordings root (`record`) | |
//! | `--data` | Reference recording (`compare`) | |
//! | `--source`, `-s` | OpenPose JSON directory or camera index | `0` |
//! | `--patient` | Patient name stored in the recording | `""` |
//! | `--root` | Recordings root | `recordings` |
//! | `--config` | JSON session configuration | |
//! | `--max-frames` | Stop after N frames | unlimited |
//! | `--min-conf` | Minimum keypoint confidence | `0.1` |
//! | `--verbose` | Show verbose output | `true` |
//!
//! ## Recording Format
//!
//! ```json
//! {
//!     "patient_name": "Zoë",
//!     "joint_angles": [
//!         { "left_elbow": 92.4, "right_elbow": 88.1 },
//!         { "left_elbow": 95.0 }
//!     ]
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`sequence`] | [`SkeletonSequence`] and the recording format |
//! | [`skeleton`] | [`Skeleton`] pose samples |
//! | [`angles`] | [`JointAngles`] and angle derivation |
//! | [`keypoints`] | [`Keypoint`] and [`PoseFrame`] |
//! | [`topology`] | `BODY_25` joints |
//! | [`source`] | Pose sources ([`PoseSource`], [`OpenPoseJsonSource`]) |
//! | [`compare`] | [`Comparator`] seam |
//! | [`session`] | Record/compare driver ([`Session`]) |
//! | [`config`] | [`SessionConfig`] |
//! | [`error`] | Error types ([`RecorderError`], [`Result`]) |

// Modules
pub mod angles;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod keypoints;
pub mod mode;
pub mod sequence;
pub mod session;
pub mod skeleton;
pub mod source;
pub mod topology;

// Re-export main types for convenience
pub use angles::{AngleDeriver, Body25AngleDeriver, JointAngles};
pub use compare::{Comparator, ComparisonSummary, SummaryComparator};
pub use config::SessionConfig;
pub use error::{RecorderError, Result};
pub use keypoints::{Keypoint, PoseFrame};
pub use mode::SessionMode;
pub use sequence::{Origin, RawRecording, SequenceRecord, SequenceState, SkeletonSequence};
pub use session::{Session, SessionReport};
pub use skeleton::Skeleton;
pub use source::{FrameBuffer, OpenPoseJsonSource, PoseSource, Source};
pub use topology::{Joint, NUM_JOINTS};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-recorder");
    }
}
