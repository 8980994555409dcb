use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RuleFeedback;

/// Neutral score used wherever a judge has no opinion.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Per-judge scores that fed the final fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub ai: f64,
    pub bio: f64,
    pub pt: f64,
}

impl ComponentScores {
    pub fn new(ai: f64, bio: f64, pt: f64) -> Self {
        Self { ai, bio, pt }
    }

    /// Clamp each score into [0, 1]. NaN becomes the neutral score.
    pub fn sanitized(self) -> Self {
        Self {
            ai: unit_interval(self.ai),
            bio: unit_interval(self.bio),
            pt: unit_interval(self.pt),
        }
    }
}

/// Clamp into [0, 1], mapping NaN to [`NEUTRAL_SCORE`].
pub fn unit_interval(score: f64) -> f64 {
    if score.is_nan() {
        NEUTRAL_SCORE
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Outcome of scoring one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameScoreResult {
    /// Weighted fusion of the three judges, in [0, 1], two decimals.
    pub final_score: f64,
    pub ai_feedback: String,
    /// One entry per violated rule, in rule order.
    pub bio_feedback: Vec<RuleFeedback>,
    pub pt_feedback: String,
    pub scores: ComponentScores,
    #[serde(default)]
    pub timings_ms: HashMap<String, f32>,
}

/// Whole-workout correctness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Mean correctness as a percentage, one decimal.
    pub percentage: f64,
}
