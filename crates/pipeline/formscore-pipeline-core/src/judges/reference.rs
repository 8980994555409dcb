//! Comparison against an averaged professional-trainer pose.

use serde::{Deserialize, Serialize};

use formscore_api::{KeypointFrame, ReferencePose, NEUTRAL_SCORE};

/// Mean absolute difference below which a frame is an excellent match.
pub const EXCELLENT_BELOW: f64 = 10.0;
/// Mean absolute difference below which a frame is a good match.
pub const GOOD_BELOW: f64 = 20.0;

/// Classification of a frame against the reference pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceVerdict {
    NoReference,
    InsufficientData,
    Excellent,
    Good,
    SignificantDeviation,
}

impl ReferenceVerdict {
    /// Map a mean absolute difference onto the fixed thresholds.
    /// Cut points are strict: 10 is `Good`, 20 is `SignificantDeviation`.
    pub fn classify(mean_diff: f64) -> Self {
        if mean_diff < EXCELLENT_BELOW {
            ReferenceVerdict::Excellent
        } else if mean_diff < GOOD_BELOW {
            ReferenceVerdict::Good
        } else {
            ReferenceVerdict::SignificantDeviation
        }
    }

    pub fn score(self) -> f64 {
        match self {
            ReferenceVerdict::NoReference | ReferenceVerdict::InsufficientData => NEUTRAL_SCORE,
            ReferenceVerdict::Excellent => 1.0,
            ReferenceVerdict::Good => 0.7,
            ReferenceVerdict::SignificantDeviation => 0.4,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReferenceVerdict::NoReference => "No reference trainer data available.",
            ReferenceVerdict::InsufficientData => "Insufficient data for comparison.",
            ReferenceVerdict::Excellent => "Excellent match with the reference trainer.",
            ReferenceVerdict::Good => "Good, but you can improve precision.",
            ReferenceVerdict::SignificantDeviation => {
                "Significant deviation from the reference trainer."
            }
        }
    }
}

/// Mean absolute difference over the frame's articulations. Reference values
/// missing from the pose count as 0. `None` for an empty frame.
pub fn mean_abs_difference(frame: &KeypointFrame, reference: &ReferencePose) -> Option<f64> {
    if frame.is_empty() {
        return None;
    }
    let total: f64 = frame
        .iter()
        .map(|(articulation, value)| (value - reference.get(articulation).unwrap_or(0.0)).abs())
        .sum();
    Some(total / frame.len() as f64)
}

/// Classify `frame` against `reference`.
pub fn verdict(frame: &KeypointFrame, reference: &ReferencePose) -> ReferenceVerdict {
    if reference.is_empty() {
        return ReferenceVerdict::NoReference;
    }
    match mean_abs_difference(frame, reference) {
        Some(mean) => ReferenceVerdict::classify(mean),
        None => ReferenceVerdict::InsufficientData,
    }
}

/// Feedback text and score for `frame` against `reference`.
pub fn compare(frame: &KeypointFrame, reference: &ReferencePose) -> (String, f64) {
    let v = verdict(frame, reference);
    (v.message().to_string(), v.score())
}
