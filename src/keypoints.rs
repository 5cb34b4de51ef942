// Pose Recorder 🚀 AGPL-3.0 License

//! Keypoint frames produced by the pose-estimation engine.

use ndarray::{Array3, ArrayView2, Axis, s};

use crate::error::{RecorderError, Result};

/// A single joint's position and detection confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
    /// Depth, when the model produces 3D keypoints.
    pub z: Option<f32>,
    /// Detection confidence (0.0 to 1.0). Zero means the joint was not found.
    pub confidence: f32,
}

impl Keypoint {
    /// Create a 2D keypoint.
    #[must_use]
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Create a 3D keypoint.
    #[must_use]
    pub const fn new_3d(x: f32, y: f32, z: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            confidence,
        }
    }
}

/// All keypoints detected in one camera frame.
///
/// Data has shape `(subjects, joints, channels)` where channels is 3 for
/// `(x, y, conf)` or 4 for `(x, y, z, conf)`.
#[derive(Debug, Clone)]
pub struct PoseFrame {
    /// Raw keypoint data.
    pub data: Array3<f32>,
}

impl PoseFrame {
    /// Create a new frame from raw keypoint data.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::KeypointError`] if the channel axis is not 3 or 4.
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let channels = data.shape()[2];
        if channels != 3 && channels != 4 {
            return Err(RecorderError::KeypointError(format!(
                "expected 3 or 4 channels per joint, got {channels}"
            )));
        }
        Ok(Self { data })
    }

    /// A frame in which nobody was detected.
    #[must_use]
    pub fn empty(num_joints: usize) -> Self {
        Self {
            data: Array3::zeros((0, num_joints, 3)),
        }
    }

    /// Build a frame from per-subject flat `(x, y, conf)` triples, the layout
    /// OpenPose writes as `pose_keypoints_2d`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::KeypointError`] if a subject's value count is not
    /// `num_joints * 3`.
    pub fn from_subjects(subjects: &[Vec<f32>], num_joints: usize) -> Result<Self> {
        let expected = num_joints * 3;
        let mut flat = Vec::with_capacity(subjects.len() * expected);
        for (i, values) in subjects.iter().enumerate() {
            if values.len() != expected {
                return Err(RecorderError::KeypointError(format!(
                    "subject {i} has {} values, expected {expected} ({num_joints} joints x 3)",
                    values.len()
                )));
            }
            flat.extend_from_slice(values);
        }
        let data = Array3::from_shape_vec((subjects.len(), num_joints, 3), flat)
            .map_err(|e| RecorderError::KeypointError(e.to_string()))?;
        Self::new(data)
    }

    /// Number of detected subjects.
    #[must_use]
    pub fn num_subjects(&self) -> usize {
        self.data.shape()[0]
    }

    /// Number of joints per subject.
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.data.shape()[1]
    }

    /// Whether depth is included.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.data.shape()[2] == 4
    }

    /// Raw `(joints, channels)` view of one subject.
    #[must_use]
    pub fn subject_view(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        (index < self.num_subjects()).then(|| self.data.slice(s![index, .., ..]))
    }

    /// Keypoints of one subject.
    #[must_use]
    pub fn subject(&self, index: usize) -> Option<Vec<Keypoint>> {
        let view = self.subject_view(index)?;
        let is_3d = self.is_3d();
        Some(
            view.axis_iter(Axis(0))
                .map(|row| {
                    if is_3d {
                        Keypoint::new_3d(row[0], row[1], row[2], row[3])
                    } else {
                        Keypoint::new(row[0], row[1], row[2])
                    }
                })
                .collect(),
        )
    }

    /// Keypoints of the only subject in the frame.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::MultiSubjectError`] with the subject count when the
    /// frame holds zero or more than one subject.
    pub fn single_subject(&self) -> Result<Vec<Keypoint>> {
        match self.num_subjects() {
            1 => self.subject(0).ok_or(RecorderError::MultiSubjectError(0)),
            n => Err(RecorderError::MultiSubjectError(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(offset: f32) -> Vec<f32> {
        (0..6).map(|i| offset + i as f32).collect()
    }

    #[test]
    fn test_rejects_bad_channel_count() {
        let err = PoseFrame::new(Array3::zeros((1, 25, 2))).unwrap_err();
        assert!(matches!(err, RecorderError::KeypointError(_)));
    }

    #[test]
    fn test_from_subjects_layout() {
        let frame = PoseFrame::from_subjects(&[subject(0.0)], 2).unwrap();
        assert_eq!(frame.num_subjects(), 1);
        assert_eq!(frame.num_joints(), 2);
        assert!(!frame.is_3d());

        let kps = frame.single_subject().unwrap();
        assert_eq!(kps[0], Keypoint::new(0.0, 1.0, 2.0));
        assert_eq!(kps[1], Keypoint::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_from_subjects_wrong_length() {
        let err = PoseFrame::from_subjects(&[vec![1.0, 2.0]], 2).unwrap_err();
        assert!(matches!(err, RecorderError::KeypointError(_)));
    }

    #[test]
    fn test_single_subject_rejects_zero_and_many() {
        let empty = PoseFrame::empty(25);
        assert!(matches!(
            empty.single_subject(),
            Err(RecorderError::MultiSubjectError(0))
        ));

        let two = PoseFrame::from_subjects(&[subject(0.0), subject(10.0)], 2).unwrap();
        assert!(matches!(
            two.single_subject(),
            Err(RecorderError::MultiSubjectError(2))
        ));
        assert_eq!(two.subject(1).unwrap()[0].x, 10.0);
    }

    #[test]
    fn test_3d_keypoints() {
        let data = Array3::from_shape_vec((1, 1, 4), vec![1.0, 2.0, 3.0, 0.9]).unwrap();
        let frame = PoseFrame::new(data).unwrap();
        assert!(frame.is_3d());
        assert_eq!(
            frame.single_subject().unwrap()[0],
            Keypoint::new_3d(1.0, 2.0, 3.0, 0.9)
        );
    }
}
