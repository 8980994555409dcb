//! Adapter around an external text-generation service.
//!
//! The service is injected as a [`TextGenerator`]; the adapter owns prompt
//! construction, the call deadline and reply parsing. Each call runs on its
//! own worker thread so a panicking generator cannot unwind into the caller.
//! Workers that outlive their deadline keep holding an in-flight slot until
//! the service returns; once every slot is taken, new calls fall back without
//! spawning. Every failure collapses to the fixed fallback in
//! [`AiJudge::evaluate`]. [`AiJudge::try_evaluate`] keeps them apart.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use log::{debug, warn};
use thiserror::Error;

use formscore_api::{unit_interval, KeypointFrame, NEUTRAL_SCORE};

use super::response::{parse_verdict, AiVerdict, ParseError};
use crate::config::{DEFAULT_AI_MAX_IN_FLIGHT, DEFAULT_AI_TIMEOUT_MS};

/// Feedback returned whenever the AI judge cannot give an opinion.
pub const AI_FALLBACK_FEEDBACK: &str = "AI evaluation unavailable";
/// Score returned whenever the AI judge cannot give an opinion.
pub const AI_FALLBACK_SCORE: f64 = NEUTRAL_SCORE;

/// A blocking text-in, text-out generation service.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self(prompt)
    }
}

/// Generator that always answers with the same text.
#[derive(Debug, Clone)]
pub struct StaticGenerator(pub String);

impl StaticGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self(reply.into())
    }
}

impl TextGenerator for StaticGenerator {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// Generator for deployments without an AI service. Always fails, so the
/// judge always falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGenerator;

impl TextGenerator for UnavailableGenerator {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(anyhow!("no text generation service configured"))
    }
}

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("generation worker exited without a reply")]
    Disconnected,
    #[error("{0} generation calls already in flight")]
    Saturated(usize),
    #[error("unparseable reply: {0}")]
    Parse(#[from] ParseError),
}

/// The generative judge. Clones share the in-flight limit.
#[derive(Clone)]
pub struct AiJudge {
    generator: Arc<dyn TextGenerator>,
    timeout: Option<Duration>,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
}

impl std::fmt::Debug for AiJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiJudge")
            .field("timeout", &self.timeout)
            .field("max_in_flight", &self.max_in_flight)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl AiJudge {
    /// Judge with the default deadline and in-flight limit.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: Some(Duration::from_millis(DEFAULT_AI_TIMEOUT_MS)),
            max_in_flight: DEFAULT_AI_MAX_IN_FLIGHT,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the service however long it takes.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// At least one call is always allowed.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Calls whose worker has not returned yet, timed-out ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Feedback text and score in [0, 1]. Never fails.
    pub fn evaluate(&self, frame: &KeypointFrame, exercise: &str) -> (String, f64) {
        self.submit(frame, exercise).verdict()
    }

    /// Typed variant of [`AiJudge::evaluate`]. The returned score is clamped
    /// into [0, 1].
    pub fn try_evaluate(&self, frame: &KeypointFrame, exercise: &str) -> Result<AiVerdict, JudgeError> {
        self.submit(frame, exercise).wait()
    }

    /// Start a call and return without waiting for it. The deadline runs
    /// from here.
    pub fn submit(&self, frame: &KeypointFrame, exercise: &str) -> PendingVerdict {
        let deadline = self.timeout.map(|t| (Instant::now() + t, t));
        PendingVerdict {
            exercise: exercise.to_string(),
            reply: self.spawn(build_prompt(exercise, frame)),
            deadline,
        }
    }

    fn spawn(&self, prompt: String) -> Result<Receiver<anyhow::Result<String>>, JudgeError> {
        let slot = InFlightSlot::acquire(&self.in_flight, self.max_in_flight)
            .ok_or(JudgeError::Saturated(self.max_in_flight))?;
        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        thread::Builder::new()
            .name("formscore-ai-judge".into())
            .spawn(move || {
                let _slot = slot;
                // The receiver may be gone after a timeout.
                let _ = tx.send(generator.generate(&prompt));
            })
            .map_err(|e| JudgeError::Generation(e.into()))?;
        Ok(rx)
    }
}

/// Released when the worker finishes, including by panic.
struct InFlightSlot(Arc<AtomicUsize>);

impl InFlightSlot {
    fn acquire(counter: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| Self(Arc::clone(counter)))
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// An AI call started by [`AiJudge::submit`].
#[derive(Debug)]
pub struct PendingVerdict {
    exercise: String,
    reply: Result<Receiver<anyhow::Result<String>>, JudgeError>,
    deadline: Option<(Instant, Duration)>,
}

impl PendingVerdict {
    /// Block until the reply arrives or the deadline passes.
    pub fn wait(self) -> Result<AiVerdict, JudgeError> {
        let rx = self.reply?;
        let reply = match self.deadline {
            Some((deadline, timeout)) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                rx.recv_timeout(remaining).map_err(|e| match e {
                    RecvTimeoutError::Timeout => JudgeError::Timeout(timeout),
                    RecvTimeoutError::Disconnected => JudgeError::Disconnected,
                })?
            }
            None => rx.recv().map_err(|_| JudgeError::Disconnected)?,
        };
        let reply = reply.map_err(JudgeError::Generation)?;
        let mut verdict = parse_verdict(&reply)?;
        let clamped = unit_interval(verdict.score);
        if clamped != verdict.score {
            debug!("AI score {} clamped to {}", verdict.score, clamped);
            verdict.score = clamped;
        }
        Ok(verdict)
    }

    /// [`PendingVerdict::wait`] with the fallback applied.
    pub fn verdict(mut self) -> (String, f64) {
        let exercise = std::mem::take(&mut self.exercise);
        match self.wait() {
            Ok(verdict) => (verdict.feedback, verdict.score),
            Err(e) => {
                warn!("AI judge fallback for '{}': {}", exercise, e);
                (AI_FALLBACK_FEEDBACK.to_string(), AI_FALLBACK_SCORE)
            }
        }
    }
}

/// Prompt asking for a `Score: <value>. Feedback: <text>` reply.
pub fn build_prompt(exercise: &str, frame: &KeypointFrame) -> String {
    let keypoints = serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Evaluate how correctly the exercise '{exercise}' is being performed, \
         given these keypoints: {keypoints}. \
         Return a score from 0 to 1 and a short feedback. \
         Reply in the format: 'Score: <value>. Feedback: <text>'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> KeypointFrame {
        KeypointFrame::from([("knee_angle", 95.0)])
    }

    #[test]
    fn prompt_embeds_exercise_and_keypoints() {
        let prompt = build_prompt("squat", &frame());
        assert!(prompt.contains("'squat'"));
        assert!(prompt.contains(r#"{"knee_angle":95.0}"#));
        assert!(prompt.contains("Score: <value>. Feedback: <text>"));
    }

    #[test]
    fn parses_service_reply() {
        let judge = AiJudge::new(Arc::new(StaticGenerator::new("Score: 0.9. Feedback: great")));
        let (feedback, score) = judge.evaluate(&frame(), "squat");
        assert_eq!(score, 0.9);
        assert_eq!(feedback, "great");
    }

    #[test]
    fn failing_service_falls_back() {
        let judge = AiJudge::new(Arc::new(UnavailableGenerator));
        let (feedback, score) = judge.evaluate(&frame(), "squat");
        assert_eq!(feedback, AI_FALLBACK_FEEDBACK);
        assert_eq!(score, 0.5);
        assert!(matches!(
            judge.try_evaluate(&frame(), "squat"),
            Err(JudgeError::Generation(_))
        ));
    }

    #[test]
    fn panicking_service_falls_back() {
        let generator = |_: &str| -> anyhow::Result<String> { panic!("service crashed") };
        let judge = AiJudge::new(Arc::new(generator));
        assert!(matches!(
            judge.try_evaluate(&frame(), "squat"),
            Err(JudgeError::Disconnected)
        ));
        assert_eq!(judge.evaluate(&frame(), "squat").1, 0.5);
    }

    #[test]
    fn unparseable_reply_falls_back() {
        let judge = AiJudge::new(Arc::new(StaticGenerator::new("I think it looks fine")));
        assert!(matches!(
            judge.try_evaluate(&frame(), "squat"),
            Err(JudgeError::Parse(ParseError::MissingScore))
        ));
        assert_eq!(
            judge.evaluate(&frame(), "squat"),
            (AI_FALLBACK_FEEDBACK.to_string(), 0.5)
        );
    }

    #[test]
    fn slow_service_times_out() {
        let generator = |_: &str| -> anyhow::Result<String> {
            thread::sleep(Duration::from_millis(500));
            Ok("Score: 1. Feedback: late".to_string())
        };
        let judge = AiJudge::new(Arc::new(generator)).with_timeout(Duration::from_millis(20));
        let started = Instant::now();
        assert!(matches!(
            judge.try_evaluate(&frame(), "squat"),
            Err(JudgeError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn new_judge_has_a_deadline() {
        let judge = AiJudge::new(Arc::new(UnavailableGenerator));
        assert_eq!(judge.timeout(), Some(Duration::from_millis(DEFAULT_AI_TIMEOUT_MS)));
        assert_eq!(judge.without_timeout().timeout(), None);
    }

    #[test]
    fn deadline_runs_from_submit() {
        let generator = |_: &str| -> anyhow::Result<String> {
            thread::sleep(Duration::from_millis(300));
            Ok("Score: 1. Feedback: late".to_string())
        };
        let judge = AiJudge::new(Arc::new(generator)).with_timeout(Duration::from_millis(50));
        let pending = judge.submit(&frame(), "squat");
        thread::sleep(Duration::from_millis(100));
        let started = Instant::now();
        assert!(matches!(pending.wait(), Err(JudgeError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn hung_workers_are_capped() {
        let generator = |_: &str| -> anyhow::Result<String> {
            thread::sleep(Duration::from_millis(300));
            Ok("Score: 1. Feedback: late".to_string())
        };
        let judge = AiJudge::new(Arc::new(generator))
            .with_timeout(Duration::from_millis(20))
            .with_max_in_flight(1);
        assert!(matches!(
            judge.try_evaluate(&frame(), "squat"),
            Err(JudgeError::Timeout(_))
        ));
        assert_eq!(judge.in_flight(), 1);
        assert!(matches!(
            judge.clone().try_evaluate(&frame(), "squat"),
            Err(JudgeError::Saturated(1))
        ));
        assert_eq!(judge.evaluate(&frame(), "squat").0, AI_FALLBACK_FEEDBACK);

        let waited = Instant::now();
        while judge.in_flight() > 0 && waited.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(judge.in_flight(), 0);
    }

    #[test]
    fn panicking_service_releases_its_slot() {
        let generator = |_: &str| -> anyhow::Result<String> { panic!("service crashed") };
        let judge = AiJudge::new(Arc::new(generator)).with_max_in_flight(1);
        for _ in 0..3 {
            assert!(matches!(
                judge.try_evaluate(&frame(), "squat"),
                Err(JudgeError::Disconnected)
            ));
        }
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let judge = AiJudge::new(Arc::new(StaticGenerator::new("Score: 8. Feedback: ok")));
        assert_eq!(judge.evaluate(&frame(), "squat").1, 1.0);
    }
}
