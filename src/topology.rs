// Pose Recorder 🚀 AGPL-3.0 License

//! BODY_25 joint topology.
//!
//! Joint ordering follows the OpenPose `BODY_25` model output, so index `i` of a
//! subject's keypoint array is always `Joint::ALL[i]`.

use std::fmt;

/// Number of joints in the `BODY_25` topology.
pub const NUM_JOINTS: usize = 25;

/// A joint of the `BODY_25` pose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Joint {
    Nose,
    Neck,
    RightShoulder,
    RightElbow,
    RightWrist,
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    MidHip,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    RightEye,
    LeftEye,
    RightEar,
    LeftEar,
    LeftBigToe,
    LeftSmallToe,
    LeftHeel,
    RightBigToe,
    RightSmallToe,
    RightHeel,
}

impl Joint {
    /// All joints in model output order.
    pub const ALL: [Self; NUM_JOINTS] = [
        Self::Nose,
        Self::Neck,
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::MidHip,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
        Self::RightEye,
        Self::LeftEye,
        Self::RightEar,
        Self::LeftEar,
        Self::LeftBigToe,
        Self::LeftSmallToe,
        Self::LeftHeel,
        Self::RightBigToe,
        Self::RightSmallToe,
        Self::RightHeel,
    ];

    /// Index of this joint in the model output.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a joint by its output index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Snake-case joint name, used as part of angle identifiers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Neck => "neck",
            Self::RightShoulder => "right_shoulder",
            Self::RightElbow => "right_elbow",
            Self::RightWrist => "right_wrist",
            Self::LeftShoulder => "left_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::LeftWrist => "left_wrist",
            Self::MidHip => "mid_hip",
            Self::RightHip => "right_hip",
            Self::RightKnee => "right_knee",
            Self::RightAnkle => "right_ankle",
            Self::LeftHip => "left_hip",
            Self::LeftKnee => "left_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightEye => "right_eye",
            Self::LeftEye => "left_eye",
            Self::RightEar => "right_ear",
            Self::LeftEar => "left_ear",
            Self::LeftBigToe => "left_big_toe",
            Self::LeftSmallToe => "left_small_toe",
            Self::LeftHeel => "left_heel",
            Self::RightBigToe => "right_big_toe",
            Self::RightSmallToe => "right_small_toe",
            Self::RightHeel => "right_heel",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Pose model names accepted by the recorder.
pub const SUPPORTED_MODELS: [&str; 1] = ["BODY_25"];
