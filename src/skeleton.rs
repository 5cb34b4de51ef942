// Pose Recorder 🚀 AGPL-3.0 License

//! One pose sample.

use crate::angles::{AngleDeriver, JointAngles};
use crate::error::{RecorderError, Result};
use crate::keypoints::{Keypoint, PoseFrame};

/// One detected pose at one instant.
///
/// A skeleton built from a live frame keeps its keypoints and always has angles
/// derived before it exists. A skeleton rebuilt from a recording has no keypoints
/// and carries the stored angles unchanged. Skeletons are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    keypoints: Option<Vec<Keypoint>>,
    joint_angles: JointAngles,
}

impl Skeleton {
    /// Build a skeleton from one subject's live keypoints.
    ///
    /// # Errors
    ///
    /// Propagates any error from the angle deriver. Returns
    /// [`RecorderError::AngleError`] if a derived angle is NaN or infinite, since
    /// JSON cannot store it.
    pub fn from_keypoints<D>(keypoints: Vec<Keypoint>, deriver: &D) -> Result<Self>
    where
        D: AngleDeriver + ?Sized,
    {
        let joint_angles = deriver.derive(&keypoints)?;
        if let Some((name, value)) = joint_angles.iter().find(|(_, v)| !v.is_finite()) {
            return Err(RecorderError::AngleError(format!(
                "angle '{name}' is not finite ({value})"
            )));
        }
        Ok(Self {
            keypoints: Some(keypoints),
            joint_angles,
        })
    }

    /// Build a skeleton from a live frame.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::MultiSubjectError`] if the frame does not hold exactly one subject, or any deriver error.
    pub fn from_frame<D>(frame: &PoseFrame, deriver: &D) -> Result<Self>
    where
        D: AngleDeriver + ?Sized,
    {
        Self::from_keypoints(frame.single_subject()?, deriver)
    }

    /// Rebuild a skeleton from stored angles. No derivation takes place.
    #[must_use]
    pub const fn from_record(joint_angles: JointAngles) -> Self {
        Self {
            keypoints: None,
            joint_angles,
        }
    }

    /// Keypoints, present only for skeletons captured live.
    #[must_use]
    pub fn keypoints(&self) -> Option<&[Keypoint]> {
        self.keypoints.as_deref()
    }

    /// Joint angles of this pose.
    #[must_use]
    pub const fn joint_angles(&self) -> &JointAngles {
        &self.joint_angles
    }

    /// Whether this skeleton came from a recording rather than a live frame.
    #[must_use]
    pub const fn is_from_record(&self) -> bool {
        self.keypoints.is_none()
    }
}
