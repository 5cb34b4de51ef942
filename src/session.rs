// Pose Recorder 🚀 AGPL-3.0 License

//! Record and compare sessions.
//!
//! A session pulls frames from a [`PoseSource`] until the source ends or the
//! configured frame limit is reached, appending one skeleton per frame. Any error,
//! including a frame with other than exactly one person, ends the session and
//! nothing is saved.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::angles::{AngleDeriver, Body25AngleDeriver};
use crate::compare::{Comparator, ComparisonSummary, SummaryComparator};
use crate::config::SessionConfig;
use crate::error::{RecorderError, Result};
use crate::mode::SessionMode;
use crate::sequence::SkeletonSequence;
use crate::source::PoseSource;
use crate::verbose;

/// Outcome of a completed session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Mode the session ran in.
    pub mode: SessionMode,
    /// Skeletons captured.
    pub frames: usize,
    /// Wall time spent capturing.
    pub elapsed: Duration,
    /// Recording written by a record session.
    pub saved_to: Option<PathBuf>,
    /// Summary produced by a compare session.
    pub comparison: Option<ComparisonSummary>,
}

/// Session driver holding the configuration and the angle deriver.
#[derive(Debug, Clone)]
pub struct Session<D = Body25AngleDeriver> {
    config: SessionConfig,
    deriver: D,
}

impl Session<Body25AngleDeriver> {
    /// Create a session using the `BODY_25` angle deriver.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ConfigError`] if the configuration is invalid.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let deriver = Body25AngleDeriver::new(config.min_confidence);
        Self::with_deriver(config, deriver)
    }
}

impl<D: AngleDeriver> Session<D> {
    /// Create a session with a custom angle deriver.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ConfigError`] if the configuration is invalid.
    pub fn with_deriver(config: SessionConfig, deriver: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, deriver })
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Capture a live sequence from `source`.
    ///
    /// # Errors
    ///
    /// Returns the first error from the source or from appending a frame.
    pub fn capture(&self, source: &mut dyn PoseSource) -> Result<SkeletonSequence> {
        verbose!("Capturing from {}", source.describe());

        let mut sequence = SkeletonSequence::new();
        while self
            .config
            .max_frames
            .is_none_or(|max| sequence.len() < max)
        {
            let Some(frame) = source.next_frame() else {
                break;
            };
            sequence.add(&frame?, &self.deriver)?;
        }
        Ok(sequence)
    }

    /// Capture a sequence and save it under `<recordings_root>/<folder>/`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::MissingArgumentError`] for an empty folder name, any
    /// capture error, or [`RecorderError::FileWriteError`] if the folder does not
    /// exist or cannot be written.
    pub fn record(
        &self,
        source: &mut dyn PoseSource,
        folder: &str,
        subject_label: &str,
    ) -> Result<SessionReport> {
        if folder.is_empty() {
            return Err(RecorderError::MissingArgumentError(
                "--folder is required to save a recording".to_string(),
            ));
        }
        let action_dir = self.config.action_dir(folder);

        let start = Instant::now();
        let mut sequence = self.capture(source)?;
        let elapsed = start.elapsed();

        let path = sequence.save_to_file(&action_dir, subject_label)?;
        Ok(SessionReport {
            mode: SessionMode::Record,
            frames: sequence.len(),
            elapsed,
            saved_to: Some(path),
            comparison: None,
        })
    }

    /// Load `reference`, capture a sequence, and summarize both.
    ///
    /// The reference is loaded before any frame is read.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::FileReadError`] if the reference cannot be loaded, or
    /// any capture error.
    pub fn compare(&self, source: &mut dyn PoseSource, reference: &Path) -> Result<SessionReport> {
        let reference = SkeletonSequence::load_from_file(reference)?;
        verbose!(
            "Loaded reference '{}' with {} skeletons",
            reference.subject_label(),
            reference.len()
        );

        let start = Instant::now();
        let (captured, summary) = self.compare_with(source, &reference, &SummaryComparator)?;
        Ok(SessionReport {
            mode: SessionMode::Compare,
            frames: captured.len(),
            elapsed: start.elapsed(),
            saved_to: None,
            comparison: Some(summary),
        })
    }

    /// Capture a sequence and run `comparator` against an already loaded reference.
    ///
    /// # Errors
    ///
    /// Returns any capture or comparator error.
    pub fn compare_with<C: Comparator>(
        &self,
        source: &mut dyn PoseSource,
        reference: &SkeletonSequence,
        comparator: &C,
    ) -> Result<(SkeletonSequence, C::Output)> {
        let captured = self.capture(source)?;
        let output = comparator.compare(reference, &captured)?;
        Ok((captured, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::JointAngles;
    use crate::keypoints::{Keypoint, PoseFrame};
    use crate::source::FrameBuffer;

    fn one_person() -> PoseFrame {
        PoseFrame::from_subjects(&[vec![1.0; 6]], 2).unwrap()
    }

    fn two_people() -> PoseFrame {
        PoseFrame::from_subjects(&[vec![1.0; 6], vec![2.0; 6]], 2).unwrap()
    }

    fn session(root: &Path) -> Session<fn(&[Keypoint]) -> JointAngles> {
        fn derive(kps: &[Keypoint]) -> JointAngles {
            JointAngles::from_iter([("hip", f64::from(kps[1].y))])
        }
        let config = SessionConfig::new().with_recordings_root(root);
        Session::with_deriver(config, derive as fn(&[Keypoint]) -> JointAngles).unwrap()
    }

    #[test]
    fn test_capture_until_source_ends() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameBuffer::new(vec![one_person(); 3]);
        let seq = session(dir.path()).capture(&mut source).unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_capture_stops_at_max_frames() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::new()
            .with_recordings_root(dir.path())
            .with_max_frames(2);
        let session = Session::new(config).unwrap();

        let body = PoseFrame::from_subjects(&[vec![1.0; 75]], 25).unwrap();
        let mut source = FrameBuffer::new(vec![body; 5]);

        let seq = session.capture(&mut source).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn test_record_saves_into_action_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("squat")).unwrap();

        let mut source = FrameBuffer::new(vec![one_person(); 2]);
        let report = session(dir.path())
            .record(&mut source, "squat", "Zoë")
            .unwrap();

        assert_eq!(report.mode, SessionMode::Record);
        assert_eq!(report.frames, 2);
        let saved = report.saved_to.unwrap();
        assert!(saved.starts_with(dir.path().join("squat")));

        let loaded = SkeletonSequence::load_from_file(&saved).unwrap();
        assert_eq!(loaded.subject_label(), "Zoë");
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_record_multi_subject_aborts_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("squat")).unwrap();

        let mut source = FrameBuffer::new(vec![one_person(), two_people(), one_person()]);
        let err = session(dir.path())
            .record(&mut source, "squat", "")
            .unwrap_err();

        assert!(matches!(err, RecorderError::MultiSubjectError(2)));
        assert_eq!(source.remaining(), 1);
        assert_eq!(std::fs::read_dir(dir.path().join("squat")).unwrap().count(), 0);
    }

    #[test]
    fn test_record_requires_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameBuffer::new(vec![one_person()]);
        let err = session(dir.path())
            .record(&mut source, "missing", "")
            .unwrap_err();
        assert!(matches!(err, RecorderError::FileWriteError(_)));
        assert!(!dir.path().join("missing").exists());

        let err = session(dir.path()).record(&mut source, "", "").unwrap_err();
        assert!(matches!(err, RecorderError::MissingArgumentError(_)));
    }

    #[test]
    fn test_compare_loads_reference_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameBuffer::new(vec![one_person()]);
        let err = session(dir.path())
            .compare(&mut source, &dir.path().join("absent.json"))
            .unwrap_err();

        assert!(matches!(err, RecorderError::FileReadError(_)));
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn test_compare_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.json");
        std::fs::write(
            &reference,
            r#"{"patient_name": "ref", "joint_angles": [{"hip": 1.0}, {"knee": 2.0}]}"#,
        )
        .unwrap();

        let mut source = FrameBuffer::new(vec![one_person(); 3]);
        let report = session(dir.path()).compare(&mut source, &reference).unwrap();

        assert_eq!(report.mode, SessionMode::Compare);
        assert_eq!(report.frames, 3);
        assert!(report.saved_to.is_none());
        let summary = report.comparison.unwrap();
        assert_eq!(summary.reference_frames, 2);
        assert_eq!(summary.candidate_frames, 3);
        assert_eq!(summary.shared_angles, ["hip"]);
        assert_eq!(summary.reference_only, ["knee"]);
    }

    #[test]
    fn test_source_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FrameBuffer::new(vec![one_person()]);
        source.push_error(RecorderError::CaptureDeviceError("lost".into()));
        source.push(one_person());

        let err = session(dir.path()).capture(&mut source).unwrap_err();
        assert!(matches!(err, RecorderError::CaptureDeviceError(_)));
    }
}
