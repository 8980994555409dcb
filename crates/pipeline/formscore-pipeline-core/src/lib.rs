//! formscore-pipeline
//!
//! Movement-quality scoring for one frame of keypoints at a time. Three
//! independent judges look at the frame:
//!
//! - the biomechanical rule checker ([`judges::biomechanical`]),
//! - a generative AI judge behind an injected [`TextGenerator`] ([`judges::ai`]),
//! - a comparison with an averaged trainer pose ([`judges::reference`]),
//!
//! and [`aggregate`] fuses their scores with fixed weights. Workouts are
//! reduced to a single percentage with [`aggregate::percentage`].
//!
//! Nothing in the pipeline returns an error to the caller: missing data and
//! remote failures fall back to neutral scores and are logged.

pub mod aggregate;
pub mod angles;
pub mod config;
pub mod judges;
pub mod metrics;
pub mod scheduler;
pub mod sources;

use std::sync::Arc;

use formscore_api::{FrameScoreResult, KeypointFrame, LandmarkFrame, WorkoutSummary};

use crate::metrics::movement_metrics;

pub use crate::config::{ConfigError, PipelineConfig};
pub use crate::judges::{
    AiJudge, MissingValuePolicy, PendingVerdict, StaticGenerator, TextGenerator, UnavailableGenerator,
};
pub use crate::metrics::MovementMetrics;
pub use crate::scheduler::Schedule;
pub use crate::sources::{ReferenceLibrary, ReferenceSource, RuleSource, RuleTable, StoreError};

/// Entry point used by request handlers.
#[derive(Clone)]
pub struct FormPipeline {
    pub(crate) rules: Arc<dyn RuleSource>,
    pub(crate) references: Arc<dyn ReferenceSource>,
    pub(crate) ai: AiJudge,
    pub(crate) schedule: Schedule,
    pub(crate) missing_value: MissingValuePolicy,
}

impl std::fmt::Debug for FormPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormPipeline")
            .field("ai", &self.ai)
            .field("schedule", &self.schedule)
            .field("missing_value", &self.missing_value)
            .finish_non_exhaustive()
    }
}

impl FormPipeline {
    /// Create a pipeline from its collaborators with the default schedule and
    /// missing-value policy.
    pub fn new(rules: Arc<dyn RuleSource>, references: Arc<dyn ReferenceSource>, ai: AiJudge) -> Self {
        Self {
            rules,
            references,
            ai,
            schedule: Schedule::default(),
            missing_value: MissingValuePolicy::default(),
        }
    }

    /// Build a pipeline from configuration. Unreadable rule or reference files
    /// are logged and treated as empty.
    pub fn from_config(cfg: &PipelineConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let rules = match &cfg.rules_path {
            Some(path) => RuleTable::load_or_empty(path),
            None => RuleTable::builtin(),
        };
        let references = match &cfg.references_path {
            Some(path) => ReferenceLibrary::load_or_empty(path),
            None => ReferenceLibrary::new(),
        };
        let ai = AiJudge::new(generator)
            .with_timeout(cfg.ai_timeout())
            .with_max_in_flight(cfg.ai_max_in_flight);
        Self::new(Arc::new(rules), Arc::new(references), ai)
            .with_schedule(cfg.schedule)
            .with_missing_value(cfg.missing_value)
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_missing_value(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value = policy;
        self
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Score one frame of keypoints for `exercise`.
    pub fn evaluate_frame(&self, exercise: &str, frame: &KeypointFrame) -> FrameScoreResult {
        match self.schedule {
            Schedule::Sequential => scheduler::run_sequential(self, exercise, frame),
            Schedule::Concurrent => scheduler::run_concurrent(self, exercise, frame),
        }
    }

    /// Score a repetition given as raw landmarks: articulations are measured
    /// on the middle frame first.
    pub fn evaluate_landmarks(&self, exercise: &str, sequence: &[LandmarkFrame]) -> FrameScoreResult {
        let frame = angles::extract(sequence);
        self.evaluate_frame(exercise, &frame)
    }

    /// Range of motion, stability, symmetry and tempo of a repetition given
    /// as raw landmarks.
    pub fn movement_metrics(&self, sequence: &[LandmarkFrame]) -> MovementMetrics {
        movement_metrics(sequence)
    }

    /// Reduce per-exercise correctness fractions to a workout percentage.
    pub fn evaluate_workout(&self, values: &[f64]) -> WorkoutSummary {
        aggregate::summarize(values)
    }
}
