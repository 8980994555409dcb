//! Scalar measurements keyed by articulation name.
//!
//! A frame captured from the user and a reference pose averaged from a trainer
//! share the same shape: `articulation -> f64`. Keys are kept ordered so that
//! iteration (and anything rendered from it, such as prompts) is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered mapping from articulation name to a scalar measurement
/// (an angle in degrees or a normalized coordinate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticulationMap {
    values: BTreeMap<String, f64>,
}

/// One sampled instant of the user's pose.
pub type KeypointFrame = ArticulationMap;

/// Averaged professional-trainer profile for one exercise. May be empty.
pub type ReferencePose = ArticulationMap;

impl ArticulationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an articulation. Absence is reported, never defaulted.
    pub fn get(&self, articulation: &str) -> Option<f64> {
        self.values.get(articulation).copied()
    }

    pub fn insert(&mut self, articulation: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(articulation.into(), value)
    }

    pub fn contains(&self, articulation: &str) -> bool {
        self.values.contains_key(articulation)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in articulation-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn articulations(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ArticulationMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for ArticulationMap {
    fn from(pairs: [(K, f64); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reports_absence() {
        let frame = KeypointFrame::from([("knee_angle", 175.0)]);
        assert_eq!(frame.get("knee_angle"), Some(175.0));
        assert_eq!(frame.get("hip_angle"), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let frame = KeypointFrame::from([("b", 2.0), ("a", 1.0)]);
        let text = serde_json::to_string(&frame).unwrap();
        assert_eq!(text, r#"{"a":1.0,"b":2.0}"#);
        let back: KeypointFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(back, frame);
    }
}
