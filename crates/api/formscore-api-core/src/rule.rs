//! Biomechanical rules and the feedback produced when one is violated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied between an observed articulation value and a rule limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    GreaterThan,
    LessThan,
}

impl Condition {
    /// True when `value` breaks the rule at `limit`. Both comparisons are strict.
    pub fn is_violated_by(self, value: f64, limit: f64) -> bool {
        match self {
            Condition::GreaterThan => value > limit,
            Condition::LessThan => value < limit,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Condition::GreaterThan => ">",
            Condition::LessThan => "<",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Condition {
    type Err = String;

    /// Accepts the symbolic form used by tabular sources (`>`, `<`) as well as
    /// the enum names in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            ">" => return Ok(Condition::GreaterThan),
            "<" => return Ok(Condition::LessThan),
            _ => {}
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "greater_than" | "greaterthan" | "gt" => Ok(Condition::GreaterThan),
            "less_than" | "lessthan" | "lt" => Ok(Condition::LessThan),
            _ => Err(format!("unknown rule condition '{trimmed}'")),
        }
    }
}

/// Informational severity carried from the rule table into feedback.
/// It does not influence the biomechanical score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A single threshold check on one articulation for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomechanicalRule {
    pub exercise: String,
    pub articulation: String,
    pub condition: Condition,
    pub limit: f64,
    pub error_id: String,
    pub error_description: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl BiomechanicalRule {
    pub fn new(
        exercise: impl Into<String>,
        articulation: impl Into<String>,
        condition: Condition,
        limit: f64,
    ) -> Self {
        Self {
            exercise: exercise.into(),
            articulation: articulation.into(),
            condition,
            limit,
            error_id: String::new(),
            error_description: String::new(),
            suggestion: String::new(),
            severity: None,
        }
    }

    pub fn with_error(
        mut self,
        error_id: impl Into<String>,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        self.error_id = error_id.into();
        self.error_description = description.into();
        self.suggestion = suggestion.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Feedback entry for a violation of this rule observed at `value`.
    pub fn feedback(&self, observed: Option<f64>) -> RuleFeedback {
        RuleFeedback {
            error_id: self.error_id.clone(),
            description: self.error_description.clone(),
            suggestion: self.suggestion.clone(),
            articulation: self.articulation.clone(),
            observed,
            severity: self.severity.unwrap_or_default(),
        }
    }
}

/// One violated rule, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFeedback {
    pub error_id: String,
    pub description: String,
    pub suggestion: String,
    pub articulation: String,
    /// Value that triggered the violation; `None` when the articulation was
    /// absent and a default stood in for it.
    pub observed: Option<f64>,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_parses_symbols_and_names() {
        assert_eq!(">".parse::<Condition>(), Ok(Condition::GreaterThan));
        assert_eq!(" < ".parse::<Condition>(), Ok(Condition::LessThan));
        assert_eq!("GREATER_THAN".parse::<Condition>(), Ok(Condition::GreaterThan));
        assert_eq!("less_than".parse::<Condition>(), Ok(Condition::LessThan));
        assert!(">=".parse::<Condition>().is_err());
    }

    #[test]
    fn comparisons_are_strict() {
        assert!(!Condition::GreaterThan.is_violated_by(170.0, 170.0));
        assert!(Condition::GreaterThan.is_violated_by(170.5, 170.0));
        assert!(!Condition::LessThan.is_violated_by(90.0, 90.0));
        assert!(Condition::LessThan.is_violated_by(89.9, 90.0));
    }

    #[test]
    fn condition_serializes_screaming_case() {
        let text = serde_json::to_string(&Condition::GreaterThan).unwrap();
        assert_eq!(text, "\"GREATER_THAN\"");
    }
}
