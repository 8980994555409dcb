//! formscore-api-core: shared data model for movement-quality scoring.
//!
//! Everything here is plain data: keypoint frames and reference poses keyed by
//! articulation name, pose landmarks, biomechanical rules and the result types
//! returned to callers. Scoring logic lives in `formscore-pipeline-core`.

pub mod articulation;
pub mod json;
pub mod landmark;
pub mod result;
pub mod rule;

pub use articulation::{ArticulationMap, KeypointFrame, ReferencePose};
pub use json::JsonError;
pub use landmark::{Landmark, LandmarkFrame, LandmarkIndex, LandmarkSequence};
pub use result::{unit_interval, ComponentScores, FrameScoreResult, WorkoutSummary, NEUTRAL_SCORE};
pub use rule::{BiomechanicalRule, Condition, RuleFeedback, Severity};
