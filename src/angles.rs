// Pose Recorder 🚀 AGPL-3.0 License

//! Joint angles and the seam for deriving them from keypoints.
//!
//! The recorder treats angles as an opaque payload: a [`Skeleton`](crate::Skeleton)
//! built from a live frame asks an [`AngleDeriver`] for them, a skeleton rebuilt
//! from a recording takes them verbatim. [`Body25AngleDeriver`] is the deriver the
//! CLI uses; library callers may inject their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RecorderError, Result};
use crate::keypoints::Keypoint;
use crate::topology::{Joint, NUM_JOINTS};

/// Angle identifier to angle value (degrees) for one frame.
///
/// Keys are kept sorted so serialized frames have a stable field order. A key
/// that is absent means the angle was not available for that frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointAngles(BTreeMap<String, f64>);

impl JointAngles {
    /// Create an empty angle mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle value for `name`, if present in this frame.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Insert or replace an angle.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Whether an angle is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of angles present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no angles are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Angle identifiers in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for JointAngles {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Computes joint angles from one subject's keypoints.
pub trait AngleDeriver {
    /// Derive the angle mapping for one subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypoints cannot be interpreted.
    fn derive(&self, keypoints: &[Keypoint]) -> Result<JointAngles>;
}

impl<F> AngleDeriver for F
where
    F: Fn(&[Keypoint]) -> JointAngles,
{
    fn derive(&self, keypoints: &[Keypoint]) -> Result<JointAngles> {
        Ok(self(keypoints))
    }
}

/// Joint triplets `(a, vertex, c)`; the angle is measured at `vertex`.
const ANGLE_TRIPLETS: [(Joint, Joint, Joint); 11] = [
    (Joint::Nose, Joint::Neck, Joint::MidHip),
    (Joint::Neck, Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
    (Joint::Neck, Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
    (Joint::MidHip, Joint::RightHip, Joint::RightKnee),
    (Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
    (Joint::RightKnee, Joint::RightAnkle, Joint::RightBigToe),
    (Joint::MidHip, Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::LeftKnee, Joint::LeftAnkle, Joint::LeftBigToe),
];

/// Interior joint angles for the `BODY_25` topology.
///
/// Each angle is keyed by its vertex joint name (`right_elbow`, `left_knee`, ...).
/// Angles whose joints fall below `min_confidence` are left out of the frame.
#[derive(Debug, Clone, Copy)]
pub struct Body25AngleDeriver {
    /// Minimum keypoint confidence for a joint to take part in an angle.
    pub min_confidence: f32,
}

impl Default for Body25AngleDeriver {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
        }
    }
}

impl Body25AngleDeriver {
    /// Create a deriver with the given confidence threshold.
    #[must_use]
    pub const fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    /// Names of every angle this deriver can produce.
    pub fn angle_names() -> impl Iterator<Item = &'static str> {
        ANGLE_TRIPLETS.iter().map(|(_, vertex, _)| vertex.name())
    }
}

impl AngleDeriver for Body25AngleDeriver {
    fn derive(&self, keypoints: &[Keypoint]) -> Result<JointAngles> {
        if keypoints.len() != NUM_JOINTS {
            return Err(RecorderError::KeypointError(format!(
                "BODY_25 expects {NUM_JOINTS} keypoints, got {}",
                keypoints.len()
            )));
        }

        let mut angles = JointAngles::new();
        for (a, vertex, c) in ANGLE_TRIPLETS {
            let (pa, pb, pc) = (
                keypoints[a.index()],
                keypoints[vertex.index()],
                keypoints[c.index()],
            );
            if [pa, pb, pc]
                .iter()
                .any(|kp| kp.confidence < self.min_confidence)
            {
                continue;
            }
            if let Some(deg) = angle_at(&pa, &pb, &pc) {
                angles.insert(vertex.name(), deg);
            }
        }
        Ok(angles)
    }
}

/// Angle in degrees at `vertex` between the rays to `a` and `c`.
///
/// Uses depth when all three keypoints carry it. Returns `None` if either ray has
/// zero length or a coordinate is not finite.
#[must_use]
pub fn angle_at(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> Option<f64> {
    let depth = |kp: &Keypoint| match (a.z, vertex.z, c.z) {
        (Some(_), Some(_), Some(_)) => f64::from(kp.z.unwrap_or_default()),
        _ => 0.0,
    };
    let u = [
        f64::from(a.x - vertex.x),
        f64::from(a.y - vertex.y),
        depth(a) - depth(vertex),
    ];
    let v = [
        f64::from(c.x - vertex.x),
        f64::from(c.y - vertex.y),
        depth(c) - depth(vertex),
    ];

    let dot = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    let norm_u = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
    let norm_v = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if !(dot.is_finite() && norm_u.is_finite() && norm_v.is_finite()) {
        return None;
    }
    if norm_u < f64::EPSILON || norm_v < f64::EPSILON {
        return None;
    }

    let cos = (dot / (norm_u * norm_v)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
