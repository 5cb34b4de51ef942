// Pose Recorder 🚀 AGPL-3.0 License

//! Pose sources.
//!
//! A [`PoseSource`] stands in for the pose-estimation engine: each call yields the
//! keypoints detected in the next frame. The recorder ships a replay source for
//! directories written by OpenPose's `--write_json` flag and an in-memory buffer.
//! Live camera capture is provided by the caller.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RecorderError, Result};
use crate::keypoints::PoseFrame;
use crate::topology::NUM_JOINTS;

/// Yields one keypoint frame per captured image.
pub trait PoseSource {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Result<PoseFrame>>;

    /// Short human-readable description for log output.
    fn describe(&self) -> String;
}

/// Input selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Camera device index.
    Webcam(u32),
    /// Directory of OpenPose JSON frame files.
    OpenPoseDir(PathBuf),
}

impl Source {
    /// Open the source for reading.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::CaptureDeviceError`] for camera indices, since this
    /// build has no camera backend, or when the replay directory cannot be read.
    pub fn open(&self) -> Result<Box<dyn PoseSource>> {
        match self {
            Self::Webcam(idx) => Err(RecorderError::CaptureDeviceError(format!(
                "camera {idx} unavailable: live capture requires an external pose-estimation backend"
            ))),
            Self::OpenPoseDir(dir) => Ok(Box::new(OpenPoseJsonSource::open(dir)?)),
        }
    }
}

/// Convert from a command-line string to Source.
impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }
        Self::OpenPoseDir(PathBuf::from(s))
    }
}

/// Frames held in memory, yielded in insertion order.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: VecDeque<Result<PoseFrame>>,
}

impl FrameBuffer {
    /// Create a buffer that yields `frames` in order.
    #[must_use]
    pub fn new(frames: Vec<PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    /// Append a frame.
    pub fn push(&mut self, frame: PoseFrame) {
        self.frames.push_back(Ok(frame));
    }

    /// Append a capture failure, yielded in turn like a frame.
    pub fn push_error(&mut self, err: RecorderError) {
        self.frames.push_back(Err(err));
    }

    /// Frames not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for FrameBuffer {
    fn next_frame(&mut self) -> Option<Result<PoseFrame>> {
        self.frames.pop_front()
    }

    fn describe(&self) -> String {
        format!("in-memory buffer ({} frames)", self.frames.len())
    }
}

/// One OpenPose `--write_json` frame file.
#[derive(Debug, Deserialize)]
struct OpenPoseFrame {
    #[serde(default)]
    people: Vec<OpenPosePerson>,
}

#[derive(Debug, Deserialize)]
struct OpenPosePerson {
    #[serde(default)]
    pose_keypoints_2d: Vec<f32>,
}

/// Replays a directory of OpenPose frame files (`*_keypoints.json`) in file name
/// order.
#[derive(Debug)]
pub struct OpenPoseJsonSource {
    dir: PathBuf,
    files: VecDeque<PathBuf>,
}

impl OpenPoseJsonSource {
    /// Scan `dir` for frame files.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::CaptureDeviceError`] if the directory cannot be read.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            RecorderError::CaptureDeviceError(format!("cannot open '{}': {e}", dir.display()))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with("_keypoints.json"))
            })
            .collect();
        files.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            files: files.into(),
        })
    }

    /// Frame files not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.files.len()
    }

    fn read_frame(&self, path: &Path) -> Result<PoseFrame> {
        let text = fs::read_to_string(path)
            .map_err(|e| RecorderError::FileReadError(format!("{}: {e}", path.display())))?;
        let parsed: OpenPoseFrame = serde_json::from_str(&text)
            .map_err(|e| RecorderError::FileReadError(format!("{}: {e}", path.display())))?;
        let subjects: Vec<Vec<f32>> = parsed
            .people
            .into_iter()
            .map(|p| p.pose_keypoints_2d)
            .collect();
        PoseFrame::from_subjects(&subjects, NUM_JOINTS)
    }
}

impl PoseSource for OpenPoseJsonSource {
    fn next_frame(&mut self) -> Option<Result<PoseFrame>> {
        let path = self.files.pop_front()?;
        Some(self.read_frame(&path))
    }

    fn describe(&self) -> String {
        format!(
            "OpenPose JSON directory '{}' ({} frames)",
            self.dir.display(),
            self.files.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(value: f32) -> String {
        let values = vec![value.to_string(); NUM_JOINTS * 3].join(", ");
        format!(r#"{{"pose_keypoints_2d": [{values}]}}"#)
    }

    fn write_frame(dir: &Path, index: usize, people: &[String]) {
        let body = format!(r#"{{"version": 1.3, "people": [{}]}}"#, people.join(", "));
        fs::write(dir.join(format!("video_{index:012}_keypoints.json")), body).unwrap();
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(Source::from("0"), Source::Webcam(0));
        assert_eq!(
            Source::from("frames/"),
            Source::OpenPoseDir(PathBuf::from("frames/"))
        );
    }

    #[test]
    fn test_webcam_is_unavailable() {
        let err = Source::Webcam(0).open().err().unwrap();
        assert!(matches!(err, RecorderError::CaptureDeviceError(_)));
    }

    #[test]
    fn test_openpose_replay_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), 1, &[person(2.0)]);
        write_frame(dir.path(), 0, &[person(1.0)]);
        write_frame(dir.path(), 2, &[]);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = OpenPoseJsonSource::open(dir.path()).unwrap();
        assert_eq!(source.remaining(), 3);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.num_subjects(), 1);
        assert_eq!(first.single_subject().unwrap()[0].x, 1.0);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.single_subject().unwrap()[0].x, 2.0);

        let third = source.next_frame().unwrap().unwrap();
        assert_eq!(third.num_subjects(), 0);

        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_openpose_missing_dir() {
        let err = OpenPoseJsonSource::open("/nonexistent/openpose").unwrap_err();
        assert!(matches!(err, RecorderError::CaptureDeviceError(_)));
    }

    #[test]
    fn test_openpose_malformed_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_keypoints.json"), "{ broken").unwrap();

        let mut source = OpenPoseJsonSource::open(dir.path()).unwrap();
        let err = source.next_frame().unwrap().unwrap_err();
        assert!(matches!(err, RecorderError::FileReadError(_)));
    }

    #[test]
    fn test_frame_buffer() {
        let mut buffer = FrameBuffer::new(vec![PoseFrame::empty(25)]);
        buffer.push_error(RecorderError::CaptureDeviceError("unplugged".into()));
        assert_eq!(buffer.remaining(), 2);

        assert!(buffer.next_frame().unwrap().is_ok());
        assert!(buffer.next_frame().unwrap().is_err());
        assert!(buffer.next_frame().is_none());
    }
}
