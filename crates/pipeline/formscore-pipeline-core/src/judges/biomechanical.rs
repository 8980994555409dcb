//! Deterministic rule checker.
//!
//! Score = 1 when nothing is violated, otherwise `max(0, 1 - violations / rules)`.
//! An empty rule set is "nothing to flag" and scores 1.

use serde::{Deserialize, Serialize};

use formscore_api::{BiomechanicalRule, KeypointFrame, RuleFeedback};

/// What to do when a rule names an articulation the frame does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Substitute a fixed value and evaluate the rule against it.
    UseDefault(f64),
    /// Leave the rule unviolated. It still counts toward the rule total.
    Skip,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        MissingValuePolicy::UseDefault(0.0)
    }
}

/// Result of checking one frame against an exercise's rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub feedback: Vec<RuleFeedback>,
    pub score: f64,
    pub rules_checked: usize,
}

impl RuleEvaluation {
    pub fn violations(&self) -> usize {
        self.feedback.len()
    }

    pub fn into_parts(self) -> (Vec<RuleFeedback>, f64) {
        (self.feedback, self.score)
    }
}

/// Check `frame` against `rules` with the default missing-value policy.
pub fn evaluate(frame: &KeypointFrame, rules: &[BiomechanicalRule]) -> (Vec<RuleFeedback>, f64) {
    evaluate_with(frame, rules, MissingValuePolicy::default()).into_parts()
}

/// Check `frame` against `rules`, collecting one feedback entry per violation.
pub fn evaluate_with(
    frame: &KeypointFrame,
    rules: &[BiomechanicalRule],
    missing: MissingValuePolicy,
) -> RuleEvaluation {
    let mut feedback = Vec::new();
    for rule in rules {
        let observed = frame.get(&rule.articulation);
        let value = match (observed, missing) {
            (Some(v), _) => v,
            (None, MissingValuePolicy::UseDefault(d)) => d,
            (None, MissingValuePolicy::Skip) => continue,
        };
        if rule.condition.is_violated_by(value, rule.limit) {
            feedback.push(rule.feedback(observed));
        }
    }
    let score = bio_score(feedback.len(), rules.len());
    RuleEvaluation {
        feedback,
        score,
        rules_checked: rules.len(),
    }
}

fn bio_score(violations: usize, rules: usize) -> f64 {
    if violations == 0 {
        return 1.0;
    }
    (1.0 - violations as f64 / rules.max(1) as f64).max(0.0)
}
