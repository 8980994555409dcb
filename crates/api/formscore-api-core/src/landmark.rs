//! 2D pose landmarks as produced by an external pose detector.

use serde::{Deserialize, Serialize};

/// Index into the 13-point landmark layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Head = 0,
    LeftShoulder = 1,
    RightShoulder = 2,
    LeftElbow = 3,
    RightElbow = 4,
    LeftWrist = 5,
    RightWrist = 6,
    LeftHip = 7,
    RightHip = 8,
    LeftKnee = 9,
    RightKnee = 10,
    LeftAnkle = 11,
    RightAnkle = 12,
}

impl LandmarkIndex {
    pub const COUNT: usize = 13;

    pub const LEFT_SIDE: [LandmarkIndex; 6] = [
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
    ];

    pub const RIGHT_SIDE: [LandmarkIndex; 6] = [
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Head),
            1 => Some(Self::LeftShoulder),
            2 => Some(Self::RightShoulder),
            3 => Some(Self::LeftElbow),
            4 => Some(Self::RightElbow),
            5 => Some(Self::LeftWrist),
            6 => Some(Self::RightWrist),
            7 => Some(Self::LeftHip),
            8 => Some(Self::RightHip),
            9 => Some(Self::LeftKnee),
            10 => Some(Self::RightKnee),
            11 => Some(Self::LeftAnkle),
            12 => Some(Self::RightAnkle),
            _ => None,
        }
    }
}

/// Single detected point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Euclidean distance in the image plane.
    pub fn distance(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// All landmarks detected at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
    /// Capture time in milliseconds since the start of the sequence.
    #[serde(default)]
    pub timestamp_ms: f64,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: f64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }
}

/// Landmark frames of one repetition in capture order.
pub type LandmarkSequence = Vec<LandmarkFrame>;
