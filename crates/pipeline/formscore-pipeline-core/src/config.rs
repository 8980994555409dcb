//! Pipeline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::judges::MissingValuePolicy;
use crate::scheduler::Schedule;

/// Default deadline for the generative judge.
pub const DEFAULT_AI_TIMEOUT_MS: u64 = 15_000;
/// Default cap on AI calls still running, timed-out ones included.
pub const DEFAULT_AI_MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime configuration for [`crate::FormPipeline`]. Every field has a
/// default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub schedule: Schedule,
    /// Deadline for the AI call in milliseconds.
    pub ai_timeout_ms: u64,
    /// AI calls allowed to run at once. Further calls fall back immediately.
    pub ai_max_in_flight: usize,
    /// Stand-in for articulations a rule needs but the frame lacks.
    pub missing_value: MissingValuePolicy,
    /// JSON rule table. Built-in demonstration rules when absent.
    pub rules_path: Option<PathBuf>,
    /// JSON reference library. No references when absent.
    pub references_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schedule: Schedule::default(),
            ai_timeout_ms: DEFAULT_AI_TIMEOUT_MS,
            ai_max_in_flight: DEFAULT_AI_MAX_IN_FLIGHT,
            missing_value: MissingValuePolicy::default(),
            rules_path: None,
            references_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }
}
