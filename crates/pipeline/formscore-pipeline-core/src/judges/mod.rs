//! The three independent judges fused by the pipeline.
//!
//! Each judge produces a feedback payload plus a score in [0, 1]. None of them
//! returns an error to the pipeline: missing data and remote failures map to
//! documented fallback scores.

pub mod ai;
pub mod biomechanical;
pub mod reference;
pub mod response;

pub use ai::{AiJudge, JudgeError, PendingVerdict, StaticGenerator, TextGenerator, UnavailableGenerator};
pub use biomechanical::{MissingValuePolicy, RuleEvaluation};
pub use reference::ReferenceVerdict;
pub use response::{parse_verdict, AiVerdict, ParseError};
