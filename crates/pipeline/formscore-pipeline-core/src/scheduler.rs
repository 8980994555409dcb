use std::collections::HashMap;
use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};

use formscore_api::{ComponentScores, FrameScoreResult, KeypointFrame, RuleFeedback};

use crate::aggregate;
use crate::judges::{biomechanical, reference};
use crate::FormPipeline;

/// Scheduling strategies for the three judges of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Rules, reference, then AI, each awaited before the next starts.
    Sequential,
    /// AI call submitted first, rules and reference run on the caller thread
    /// while it is pending; the reply is awaited before fusion.
    #[default]
    Concurrent,
}

struct LocalJudgements {
    bio_feedback: Vec<RuleFeedback>,
    bio_score: f64,
    pt_feedback: String,
    pt_score: f64,
}

/// Run the rule checker and reference comparison, recording their timings.
fn run_local_judges(
    pipeline: &FormPipeline,
    exercise: &str,
    frame: &KeypointFrame,
    timings: &mut HashMap<String, f32>,
) -> LocalJudgements {
    let started = Instant::now();
    let rules = pipeline.rules.rules_for(exercise);
    let eval = biomechanical::evaluate_with(frame, &rules, pipeline.missing_value);
    timings.insert("bio_ms".to_string(), elapsed_ms(started));

    let started = Instant::now();
    let pose = pipeline.references.reference_for(exercise);
    let (pt_feedback, pt_score) = reference::compare(frame, &pose);
    timings.insert("pt_ms".to_string(), elapsed_ms(started));

    let (bio_feedback, bio_score) = eval.into_parts();
    LocalJudgements {
        bio_feedback,
        bio_score,
        pt_feedback,
        pt_score,
    }
}

fn run_ai_judge(
    pipeline: &FormPipeline,
    exercise: &str,
    frame: &KeypointFrame,
) -> ((String, f64), f32) {
    let started = Instant::now();
    let verdict = pipeline.ai.evaluate(frame, exercise);
    (verdict, elapsed_ms(started))
}

/// Run the judges one after another, waiting for the AI reply in turn.
pub fn run_sequential(pipeline: &FormPipeline, exercise: &str, frame: &KeypointFrame) -> FrameScoreResult {
    let total = Instant::now();
    let mut timings = HashMap::new();

    let local = run_local_judges(pipeline, exercise, frame, &mut timings);
    let (ai, ai_ms) = run_ai_judge(pipeline, exercise, frame);
    timings.insert("ai_ms".to_string(), ai_ms);

    finish(exercise, local, ai, timings, total)
}

/// Run the AI judge concurrently with the local judges. The AI worker is the
/// only extra thread.
pub fn run_concurrent(pipeline: &FormPipeline, exercise: &str, frame: &KeypointFrame) -> FrameScoreResult {
    let total = Instant::now();
    let mut timings = HashMap::new();

    let ai_started = Instant::now();
    let pending = pipeline.ai.submit(frame, exercise);
    let local = run_local_judges(pipeline, exercise, frame, &mut timings);
    let ai = pending.verdict();
    timings.insert("ai_ms".to_string(), elapsed_ms(ai_started));

    finish(exercise, local, ai, timings, total)
}

fn finish(
    exercise: &str,
    local: LocalJudgements,
    (ai_feedback, ai_score): (String, f64),
    mut timings: HashMap<String, f32>,
    total: Instant,
) -> FrameScoreResult {
    let scores = ComponentScores::new(ai_score, local.bio_score, local.pt_score).sanitized();
    let final_score = aggregate::fuse(scores);
    debug!(
        "frame '{}': ai={} bio={} pt={} final={}",
        exercise, scores.ai, scores.bio, scores.pt, final_score
    );
    timings.insert("total_ms".to_string(), elapsed_ms(total));

    FrameScoreResult {
        final_score,
        ai_feedback,
        bio_feedback: local.bio_feedback,
        pt_feedback: local.pt_feedback,
        scores,
        timings_ms: timings,
    }
}

fn elapsed_ms(started: Instant) -> f32 {
    started.elapsed().as_secs_f32() * 1000.0
}
