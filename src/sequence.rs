// Pose Recorder 🚀 AGPL-3.0 License

//! Skeleton sequences and their JSON recording format.
//!
//! A recording is one pretty-printed UTF-8 JSON file:
//!
//! ```json
//! {
//!     "patient_name": "",
//!     "joint_angles": [
//!         { "left_elbow": 92.4, "right_elbow": 88.1 },
//!         { "left_elbow": 95.0 }
//!     ]
//! }
//! ```
//!
//! Frames may carry different angle keys; a missing key means the angle was not
//! available for that frame.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::angles::{AngleDeriver, JointAngles};
use crate::error::{RecorderError, Result};
use crate::keypoints::PoseFrame;
use crate::skeleton::Skeleton;

/// The structured payload stored in a recording file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    /// Who the recording belongs to. May be empty.
    pub patient_name: String,
    /// One angle mapping per skeleton, in capture order.
    pub joint_angles: Vec<JointAngles>,
}

/// A recording exactly as it exists on disk.
///
/// The text is written back byte for byte when a loaded sequence is re-saved, so
/// key order, number formatting and fields this crate does not read all survive.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecording {
    text: String,
    value: serde_json::Value,
}

impl RawRecording {
    /// Parse recording text, checking it holds a valid [`SequenceRecord`].
    fn parse(text: String) -> serde_json::Result<(Self, SequenceRecord)> {
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let record = SequenceRecord::deserialize(&value)?;
        Ok((Self { text, value }, record))
    }

    /// The file contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed document, keys in file order.
    #[must_use]
    pub const fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Number of stored angle entries.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.value["joint_angles"].as_array().map_or(0, Vec::len)
    }
}

/// Where a sequence's skeletons came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    /// Captured from a live source during this session.
    Live,
    /// Read from a recording; holds the file exactly as read.
    Loaded(RawRecording),
}

/// Lifecycle state of a [`SkeletonSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Live sequence with no skeletons yet.
    Empty,
    /// Live sequence receiving skeletons.
    Accumulating,
    /// Read from a recording. Read-only.
    Loaded,
    /// Written to disk. Read-only.
    Saved,
}

#[derive(Debug, Clone)]
struct SavedRecord {
    path: PathBuf,
    record: RawRecording,
}

/// An ordered, append-only collection of skeletons for one session.
#[derive(Debug, Clone)]
pub struct SkeletonSequence {
    subject_label: String,
    skeletons: Vec<Skeleton>,
    origin: Origin,
    saved: Option<SavedRecord>,
}

impl Default for SkeletonSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletonSequence {
    /// Create an empty live sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subject_label: String::new(),
            skeletons: Vec::new(),
            origin: Origin::Live,
            saved: None,
        }
    }

    /// One skeleton per stored angle entry, in stored order.
    fn from_raw(raw: RawRecording, record: SequenceRecord) -> Self {
        Self {
            subject_label: record.patient_name,
            skeletons: record
                .joint_angles
                .into_iter()
                .map(Skeleton::from_record)
                .collect(),
            origin: Origin::Loaded(raw),
            saved: None,
        }
    }

    /// Load a sequence from a recording file.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::FileReadError`] if the file is missing, unreadable,
    /// or not a valid recording. No partial sequence is produced.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| RecorderError::FileReadError(format!("{}: {e}", path.display())))?;
        let (raw, record) = RawRecording::parse(text)
            .map_err(|e| RecorderError::FileReadError(format!("{}: {e}", path.display())))?;
        Ok(Self::from_raw(raw, record))
    }

    /// Load a sequence from recording JSON held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::FileReadError`] if the text is not a valid recording.
    pub fn load_from_str(json: &str) -> Result<Self> {
        let (raw, record) = RawRecording::parse(json.to_string())
            .map_err(|e| RecorderError::FileReadError(e.to_string()))?;
        Ok(Self::from_raw(raw, record))
    }

    /// Derive a skeleton from a live frame and append it.
    ///
    /// The sequence is left untouched on any error.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::SequenceStateError`] if the sequence was loaded or
    /// already saved, [`RecorderError::MultiSubjectError`] if the frame does not hold
    /// exactly one subject, [`RecorderError::AngleError`] for a non-finite angle,
    /// or any angle derivation error.
    pub fn add<D>(&mut self, frame: &PoseFrame, deriver: &D) -> Result<()>
    where
        D: AngleDeriver + ?Sized,
    {
        match self.state() {
            SequenceState::Empty | SequenceState::Accumulating => {}
            SequenceState::Loaded => {
                return Err(RecorderError::SequenceStateError(
                    "cannot add skeletons to a loaded recording".to_string(),
                ));
            }
            SequenceState::Saved => {
                return Err(RecorderError::SequenceStateError(
                    "cannot add skeletons after the sequence was saved".to_string(),
                ));
            }
        }

        let skeleton = Skeleton::from_frame(frame, deriver)?;
        self.skeletons.push(skeleton);
        Ok(())
    }

    /// Write the sequence as `recording_<YYYYMMDDTHHMMSS>.json` inside `directory`.
    ///
    /// A loaded sequence is written back exactly as it was read and `subject_label`
    /// is ignored. A live sequence is written with `subject_label` as the patient
    /// name. The directory is not created. Two saves into the same directory within
    /// the same second target the same file name.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::SequenceStateError`] if the sequence was already
    /// saved, or [`RecorderError::FileWriteError`] if the directory is missing or
    /// the file cannot be written. A failed write leaves no file behind.
    pub fn save_to_file<P: AsRef<Path>>(
        &mut self,
        directory: P,
        subject_label: &str,
    ) -> Result<PathBuf> {
        if let Some(saved) = &self.saved {
            return Err(RecorderError::SequenceStateError(format!(
                "sequence was already saved to {}",
                saved.path.display()
            )));
        }

        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(RecorderError::FileWriteError(format!(
                "directory '{}' does not exist",
                directory.display()
            )));
        }

        let raw = match &self.origin {
            Origin::Loaded(raw) => raw.clone(),
            Origin::Live => {
                let record = self.record_with_label(subject_label);
                let text = to_pretty_string(&record)?;
                let value = serde_json::to_value(&record)
                    .map_err(|e| RecorderError::FileWriteError(e.to_string()))?;
                RawRecording { text, value }
            }
        };
        let path = directory.join(recording_file_name(&Local::now()));
        write_atomic(&path, raw.as_str())?;

        if matches!(self.origin, Origin::Live) {
            self.subject_label = subject_label.to_string();
        }
        self.saved = Some(SavedRecord {
            path: path.clone(),
            record: raw,
        });
        Ok(path)
    }

    /// Typed view of the sequence: its label and each skeleton's angles.
    #[must_use]
    pub fn to_record(&self) -> SequenceRecord {
        self.record_with_label(&self.subject_label)
    }

    fn record_with_label(&self, patient_name: &str) -> SequenceRecord {
        SequenceRecord {
            patient_name: patient_name.to_string(),
            joint_angles: self
                .skeletons
                .iter()
                .map(|s| s.joint_angles().clone())
                .collect(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SequenceState {
        if self.saved.is_some() {
            SequenceState::Saved
        } else if matches!(self.origin, Origin::Loaded(_)) {
            SequenceState::Loaded
        } else if self.skeletons.is_empty() {
            SequenceState::Empty
        } else {
            SequenceState::Accumulating
        }
    }

    /// Who the sequence belongs to.
    #[must_use]
    pub fn subject_label(&self) -> &str {
        &self.subject_label
    }

    /// Skeletons in capture order.
    #[must_use]
    pub fn skeletons(&self) -> &[Skeleton] {
        &self.skeletons
    }

    /// Number of skeletons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    /// Whether the sequence holds no skeletons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }

    /// Where the skeletons came from.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The stored file contents: as loaded, or as written by the last save.
    /// `None` for a live sequence that has not been saved.
    #[must_use]
    pub fn raw_record(&self) -> Option<&RawRecording> {
        match &self.origin {
            Origin::Loaded(raw) => Some(raw),
            Origin::Live => self.saved.as_ref().map(|s| &s.record),
        }
    }

    /// Path written by [`save_to_file`](Self::save_to_file), if saved.
    #[must_use]
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved.as_ref().map(|s| s.path.as_path())
    }

    /// Every angle identifier that appears in at least one skeleton, sorted.
    #[must_use]
    pub fn angle_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .skeletons
            .iter()
            .flat_map(|s| s.joint_angles().names())
            .map(str::to_string)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// File name for a recording saved at `timestamp`.
#[must_use]
pub fn recording_file_name(timestamp: &DateTime<Local>) -> String {
    format!("recording_{}.json", timestamp.format("%Y%m%dT%H%M%S"))
}

/// Write `contents` to `path` through a temporary file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let outcome = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = outcome {
        let _ = fs::remove_file(&tmp_path);
        return Err(RecorderError::FileWriteError(format!(
            "{}: {e}",
            path.display()
        )));
    }
    Ok(())
}

/// Serialize with a four-space indent and a trailing newline.
fn to_pretty_string(record: &SequenceRecord) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record
        .serialize(&mut serializer)
        .map_err(|e| RecorderError::FileWriteError(e.to_string()))?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| RecorderError::FileWriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::Keypoint;
    use chrono::TimeZone;

    fn frame() -> PoseFrame {
        PoseFrame::from_subjects(&[vec![0.5; 6]], 2).unwrap()
    }

    fn deriver(kps: &[Keypoint]) -> JointAngles {
        JointAngles::from_iter([("knee", f64::from(kps[0].x) * 100.0)])
    }

    #[test]
    fn test_state_transitions() {
        let mut seq = SkeletonSequence::new();
        assert_eq!(seq.state(), SequenceState::Empty);
        assert!(seq.raw_record().is_none());

        seq.add(&frame(), &deriver).unwrap();
        assert_eq!(seq.state(), SequenceState::Accumulating);
        assert_eq!(seq.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = seq.save_to_file(dir.path(), "anna").unwrap();
        assert_eq!(seq.state(), SequenceState::Saved);
        assert_eq!(seq.saved_path(), Some(path.as_path()));
        assert_eq!(seq.raw_record().unwrap().frame_count(), seq.len());

        let err = seq.add(&frame(), &deriver).unwrap_err();
        assert!(matches!(err, RecorderError::SequenceStateError(_)));
        assert_eq!(seq.len(), 1);

        let err = seq.save_to_file(dir.path(), "anna").unwrap_err();
        assert!(matches!(err, RecorderError::SequenceStateError(_)));
    }

    #[test]
    fn test_add_rejects_multi_subject_without_mutation() {
        let mut seq = SkeletonSequence::new();
        seq.add(&frame(), &deriver).unwrap();

        let crowd = PoseFrame::from_subjects(&[vec![0.5; 6], vec![0.7; 6]], 2).unwrap();
        assert!(matches!(
            seq.add(&crowd, &deriver),
            Err(RecorderError::MultiSubjectError(2))
        ));
        assert!(matches!(
            seq.add(&PoseFrame::empty(2), &deriver),
            Err(RecorderError::MultiSubjectError(0))
        ));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_add_rejects_non_finite_angle() {
        let nan_deriver = |_: &[Keypoint]| JointAngles::from_iter([("knee", f64::NAN)]);
        let mut seq = SkeletonSequence::new();
        seq.add(&frame(), &deriver).unwrap();

        let err = seq.add(&frame(), &nan_deriver).unwrap_err();
        assert!(matches!(err, RecorderError::AngleError(_)));
        assert_eq!(seq.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = seq.save_to_file(dir.path(), "").unwrap();
        assert_eq!(SkeletonSequence::load_from_file(path).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_save_keeps_label_and_state() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory in place of the target makes the rename fail.
        let now = Local::now();
        for secs in 0..3 {
            let blocker = dir
                .path()
                .join(recording_file_name(&(now + chrono::Duration::seconds(secs))));
            fs::create_dir_all(blocker.join("occupied")).unwrap();
        }

        let mut seq = SkeletonSequence::new();
        seq.add(&frame(), &deriver).unwrap();
        let err = seq.save_to_file(dir.path(), "anna").unwrap_err();
        assert!(matches!(err, RecorderError::FileWriteError(_)));
        assert_eq!(seq.subject_label(), "");
        assert_eq!(seq.state(), SequenceState::Accumulating);
        assert!(seq.raw_record().is_none());

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_loaded_sequence_is_read_only() {
        let mut seq =
            SkeletonSequence::load_from_str(r#"{"patient_name": "", "joint_angles": [{}]}"#)
                .unwrap();
        assert_eq!(seq.state(), SequenceState::Loaded);
        assert!(seq.skeletons()[0].is_from_record());

        let err = seq.add(&frame(), &deriver).unwrap_err();
        assert!(matches!(err, RecorderError::SequenceStateError(_)));
    }

    #[test]
    fn test_load_rejects_missing_fields() {
        let err = SkeletonSequence::load_from_str(r#"{"patient_name": "x"}"#).unwrap_err();
        assert!(matches!(err, RecorderError::FileReadError(_)));

        let err = SkeletonSequence::load_from_str(r#"{"joint_angles": []}"#).unwrap_err();
        assert!(matches!(err, RecorderError::FileReadError(_)));

        let err = SkeletonSequence::load_from_str("not json").unwrap_err();
        assert!(matches!(err, RecorderError::FileReadError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SkeletonSequence::load_from_file("/nonexistent/recording.json").unwrap_err();
        assert!(matches!(err, RecorderError::FileReadError(_)));
    }

    #[test]
    fn test_loaded_resave_keeps_unknown_fields() {
        let json = r#"{"patient_name": "Bob", "joint_angles": [{"a": 1.0}], "session": 7}"#;
        let mut seq = SkeletonSequence::load_from_str(json).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = seq.save_to_file(dir.path(), "ignored").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), json);
        assert_eq!(seq.subject_label(), "Bob");
        assert_eq!(seq.raw_record().unwrap().value()["session"], 7);
    }

    #[test]
    fn test_loaded_record_keeps_file_key_order() {
        let json = r#"{"joint_angles": [{"right_elbow": 90, "left_elbow": 45.5}], "patient_name": "Eve"}"#;
        let seq = SkeletonSequence::load_from_str(json).unwrap();
        let raw = seq.raw_record().unwrap();

        let keys: Vec<_> = raw.value().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["joint_angles", "patient_name"]);
        let angle_keys: Vec<_> = raw.value()["joint_angles"][0]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(angle_keys, ["right_elbow", "left_elbow"]);
        assert!(raw.value()["joint_angles"][0]["right_elbow"].is_u64());
        assert_eq!(raw.as_str(), json);
        assert_eq!(seq.skeletons()[0].joint_angles().get("right_elbow"), Some(90.0));
    }

    #[test]
    fn test_save_layout() {
        let mut seq = SkeletonSequence::new();
        seq.add(&frame(), &deriver).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = seq.save_to_file(dir.path(), "").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n    \"patient_name\": \"\",\n    \"joint_angles\": [\n        {\n            \"knee\": 50.0\n        }\n    ]\n}\n"
        );

        // Only the recording is left in the directory.
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_action");
        let mut seq = SkeletonSequence::new();

        let err = seq.save_to_file(&missing, "").unwrap_err();
        assert!(matches!(err, RecorderError::FileWriteError(_)));
        assert!(!missing.exists());
        assert_eq!(seq.state(), SequenceState::Empty);
    }

    #[test]
    fn test_recording_file_name() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(recording_file_name(&ts), "recording_20240309T070501.json");
    }

    #[test]
    fn test_angle_names_union() {
        let seq = SkeletonSequence::load_from_str(
            r#"{"patient_name": "", "joint_angles": [{"b": 1.0}, {"a": 2.0, "b": 3.0}]}"#,
        )
        .unwrap();
        assert_eq!(seq.angle_names(), ["a", "b"]);
    }
}
