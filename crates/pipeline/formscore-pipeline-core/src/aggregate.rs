//! Score fusion and workout reduction.

use log::warn;
use serde_json::Value as JsonValue;

use formscore_api::{ComponentScores, WorkoutSummary};

/// Weight of the generative judge.
pub const AI_WEIGHT: f64 = 0.33;
/// Weight of the rule checker. Heaviest by one hundredth; keep as is.
pub const BIO_WEIGHT: f64 = 0.34;
/// Weight of the reference-trainer comparison.
pub const REFERENCE_WEIGHT: f64 = 0.33;

/// Round to `decimals` places on the exact decimal expansion of `value`,
/// ties to even. `0.835` is stored as `0.83499...` and rounds to `0.83`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// `round(ai * 0.33 + bio * 0.34 + pt * 0.33, 2)`.
pub fn aggregate(ai: f64, bio: f64, pt: f64) -> f64 {
    round_to(ai * AI_WEIGHT + bio * BIO_WEIGHT + pt * REFERENCE_WEIGHT, 2)
}

/// Fuse component scores after clamping each into [0, 1].
pub fn fuse(scores: ComponentScores) -> f64 {
    let s = scores.sanitized();
    aggregate(s.ai, s.bio, s.pt)
}

/// Mean correctness of a workout as a percentage with one decimal.
/// An empty workout is reported as 0.
pub fn percentage(values: &[f64]) -> f64 {
    if values.is_empty() {
        warn!("workout percentage requested for an empty result set; reporting 0");
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    round_to(mean * 100.0, 1)
}

/// [`percentage`] for untyped input. Anything other than an array of numbers
/// is reported as 0.
pub fn percentage_json(value: &JsonValue) -> f64 {
    let Some(items) = value.as_array() else {
        warn!("workout results are not a list; reporting 0");
        return 0.0;
    };
    let values: Option<Vec<f64>> = items.iter().map(JsonValue::as_f64).collect();
    match values {
        Some(values) => percentage(&values),
        None => {
            warn!("workout results contain non-numeric entries; reporting 0");
            0.0
        }
    }
}

pub fn summarize(values: &[f64]) -> WorkoutSummary {
    WorkoutSummary {
        percentage: percentage(values),
    }
}
