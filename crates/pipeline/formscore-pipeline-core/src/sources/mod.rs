//! Read-only collaborators that supply per-exercise configuration data.
//!
//! Both sources are infallible from the pipeline's point of view: a missing
//! exercise or an unreadable backing file degrades to "no data", which the
//! judges turn into neutral scores.

pub mod references;
pub mod rules;

use std::path::{Path, PathBuf};

use thiserror::Error;

use formscore_api::JsonError;

pub use references::{ReferenceLibrary, ReferenceSource};
pub use rules::{RuleSource, RuleTable};

/// Errors raised by the strict loaders. The pipeline only uses the
/// `load_or_empty` variants, which log these instead of returning them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] JsonError),
}

pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
