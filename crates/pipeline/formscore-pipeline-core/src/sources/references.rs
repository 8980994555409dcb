use std::path::Path;

use hashbrown::HashMap;
use log::{debug, error};

use formscore_api::{json, ReferencePose};

use super::{read_json, StoreError};

/// Keyed lookup of averaged trainer poses by exercise name.
pub trait ReferenceSource: Send + Sync {
    /// Reference pose for `exercise`, or an empty pose when none is recorded.
    fn reference_for(&self, exercise: &str) -> ReferencePose;
}

/// In-memory reference poses keyed by exercise.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLibrary {
    poses: HashMap<String, ReferencePose>,
}

impl ReferenceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pose(mut self, exercise: impl Into<String>, pose: ReferencePose) -> Self {
        self.insert(exercise, pose);
        self
    }

    pub fn insert(&mut self, exercise: impl Into<String>, pose: ReferencePose) -> Option<ReferencePose> {
        self.poses.insert(exercise.into(), pose)
    }

    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_pairs(json::parse_reference_library(value)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let value = read_json(path.as_ref())?;
        Ok(Self::from_pairs(json::parse_reference_library(value)?))
    }

    /// Never-failing variant of [`ReferenceLibrary::load`].
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(lib) => {
                debug!("loaded {} reference poses from {}", lib.len(), path.display());
                lib
            }
            Err(e) => {
                error!("reference library {} unavailable: {}", path.display(), e);
                Self::new()
            }
        }
    }

    fn from_pairs(pairs: Vec<(String, ReferencePose)>) -> Self {
        Self {
            poses: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl ReferenceSource for ReferenceLibrary {
    fn reference_for(&self, exercise: &str) -> ReferencePose {
        self.poses.get(exercise).cloned().unwrap_or_default()
    }
}
