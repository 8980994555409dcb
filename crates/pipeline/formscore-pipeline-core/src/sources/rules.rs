use std::path::Path;

use hashbrown::HashMap;
use log::{debug, error};

use formscore_api::{json, BiomechanicalRule, Condition, Severity};

use super::{read_json, StoreError};

/// Keyed lookup of biomechanical rules by exercise name.
pub trait RuleSource: Send + Sync {
    /// Rules for `exercise` in evaluation order. Exact, case-sensitive match.
    /// Unknown exercises yield an empty list.
    fn rules_for(&self, exercise: &str) -> Vec<BiomechanicalRule>;
}

/// In-memory rule table indexed by exercise. Row order is preserved per exercise.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    by_exercise: HashMap<String, Vec<BiomechanicalRule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = BiomechanicalRule>) -> Self {
        let mut table = Self::new();
        for rule in rules {
            table.push(rule);
        }
        table
    }

    pub fn push(&mut self, rule: BiomechanicalRule) {
        self.by_exercise
            .entry(rule.exercise.clone())
            .or_default()
            .push(rule);
    }

    /// Parse a JSON rule table (array of rows).
    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_rules(json::parse_rule_rows(value)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let value = read_json(path.as_ref())?;
        Ok(Self::from_rules(json::parse_rule_rows(value)?))
    }

    /// Like [`RuleTable::load`] but never fails: an unreadable or malformed
    /// table is logged and replaced by an empty one.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => {
                debug!(
                    "loaded {} rules for {} exercises from {}",
                    table.len(),
                    table.by_exercise.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                error!("rule table {} unavailable: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Demonstration rules for squat, pushup and lunge.
    pub fn builtin() -> Self {
        use Condition::{GreaterThan, LessThan};
        let row = |exercise: &str,
                   articulation: &str,
                   condition: Condition,
                   limit: f64,
                   error_id: &str,
                   description: &str,
                   suggestion: &str,
                   severity: Severity| {
            BiomechanicalRule::new(exercise, articulation, condition, limit)
                .with_error(error_id, description, suggestion)
                .with_severity(severity)
        };
        Self::from_rules([
            row(
                "squat",
                "knee_angle",
                GreaterThan,
                120.0,
                "knee_valgus",
                "Knees caving inward",
                "Keep your knees in line with your toes",
                Severity::High,
            ),
            row(
                "squat",
                "hip_angle",
                LessThan,
                90.0,
                "insufficient_depth",
                "Squat depth is insufficient",
                "Lower until your hips drop below knee level",
                Severity::Medium,
            ),
            row(
                "squat",
                "back_angle",
                GreaterThan,
                45.0,
                "forward_lean",
                "Leaning too far forward",
                "Keep your chest up and your back straight",
                Severity::High,
            ),
            row(
                "pushup",
                "elbow_angle",
                GreaterThan,
                45.0,
                "wide_elbows",
                "Elbows flared too wide",
                "Keep your elbows close to the body, around 45 degrees",
                Severity::Medium,
            ),
            row(
                "pushup",
                "body_line",
                GreaterThan,
                10.0,
                "sagging_hips",
                "Hips sagging toward the floor",
                "Hold a straight line from head to heels",
                Severity::High,
            ),
            row(
                "lunge",
                "front_knee_angle",
                LessThan,
                90.0,
                "shallow_lunge",
                "Lunge is too shallow",
                "Lower until the front knee reaches 90 degrees",
                Severity::Medium,
            ),
            row(
                "lunge",
                "knee_forward",
                GreaterThan,
                5.0,
                "knee_over_toe",
                "Knee travels past the toes",
                "Keep the knee stacked over the ankle",
                Severity::High,
            ),
        ])
    }

    /// Total number of rules across all exercises.
    pub fn len(&self) -> usize {
        self.by_exercise.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_exercise.is_empty()
    }

    /// Exercise names with at least one rule, sorted.
    pub fn exercises(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_exercise.keys().cloned().collect();
        names.sort();
        names
    }
}

impl RuleSource for RuleTable {
    fn rules_for(&self, exercise: &str) -> Vec<BiomechanicalRule> {
        self.by_exercise.get(exercise).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_exercise_is_empty() {
        let table = RuleTable::builtin();
        assert!(table.rules_for("deadlift").is_empty());
    }

    #[test]
    fn lookup_is_exact_match() {
        let table = RuleTable::builtin();
        assert_eq!(table.rules_for("squat").len(), 3);
        assert!(table.rules_for("Squat").is_empty());
        assert!(table.rules_for(" squat").is_empty());
    }

    #[test]
    fn preserves_row_order() {
        let table = RuleTable::builtin();
        let ids: Vec<String> = table
            .rules_for("squat")
            .into_iter()
            .map(|r| r.error_id)
            .collect();
        assert_eq!(ids, ["knee_valgus", "insufficient_depth", "forward_lean"]);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let table = RuleTable::load_or_empty("/nonexistent/rules.json");
        assert!(table.is_empty());
        assert!(table.rules_for("squat").is_empty());
    }

    #[test]
    fn strict_loader_reports_bad_rows() {
        let err = RuleTable::from_json_str(r#"[{"exercise":"squat"}]"#).unwrap_err();
        assert!(matches!(err, StoreError::Table(_)));
    }
}
