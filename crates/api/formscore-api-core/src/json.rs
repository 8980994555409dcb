//! Normalization of tabular JSON sources into typed rules and reference poses.
//!
//! Rule tables arrive as an array of row objects exported from a spreadsheet:
//!
//! ```json
//! [{ "exercise": "squat", "articulation": "knee_angle", "condition": ">",
//!    "limit": 170, "error": "knee_overextension",
//!    "description_error": "...", "suggestion": "...", "severity": "high" }]
//! ```
//!
//! Spreadsheet exports are loose about numbers, so `limit` may be a JSON number
//! or a numeric string using either `.` or `,` as the decimal separator.
//! Reference libraries are an object of `exercise -> { articulation: value }`.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::{BiomechanicalRule, Condition, ReferencePose, Severity};

/// Errors produced while normalizing rule tables or reference libraries.
#[derive(Debug, Error, PartialEq)]
pub enum JsonError {
    #[error("rule table must be a JSON array of rows")]
    NotATable,
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("reference library must be a JSON object keyed by exercise")]
    NotALibrary,
    #[error("reference '{exercise}': {reason}")]
    InvalidReference { exercise: String, reason: String },
}

/// Parse a numeric cell. Accepts JSON numbers and strings such as `"12,5"`.
pub fn parse_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parse a decimal string accepting `,` as the decimal separator.
/// Non-finite results are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a whole rule table, preserving row order.
pub fn parse_rule_rows(value: JsonValue) -> Result<Vec<BiomechanicalRule>, JsonError> {
    let rows = match value {
        JsonValue::Array(rows) => rows,
        _ => return Err(JsonError::NotATable),
    };
    rows.iter()
        .enumerate()
        .map(|(row, item)| match item {
            JsonValue::Object(obj) => parse_rule_row(row, obj),
            _ => Err(JsonError::InvalidRow {
                row,
                reason: "row is not an object".to_string(),
            }),
        })
        .collect()
}

fn parse_rule_row(row: usize, obj: &Map<String, JsonValue>) -> Result<BiomechanicalRule, JsonError> {
    let invalid = |reason: String| JsonError::InvalidRow { row, reason };

    let exercise = required_text(obj, "exercise").map_err(invalid)?;
    let articulation = required_text(obj, "articulation").map_err(invalid)?;
    let condition: Condition = required_text(obj, "condition")
        .map_err(invalid)?
        .parse()
        .map_err(invalid)?;
    let limit = obj
        .get("limit")
        .and_then(parse_number)
        .ok_or_else(|| invalid("missing or non-numeric 'limit'".to_string()))?;
    let severity = match obj.get("severity").and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Some(s.parse::<Severity>().map_err(invalid)?),
        _ => None,
    };

    Ok(BiomechanicalRule {
        exercise,
        articulation,
        condition,
        limit,
        error_id: optional_text(obj, "error"),
        error_description: optional_text(obj, "description_error"),
        suggestion: optional_text(obj, "suggestion"),
        severity,
    })
}

fn required_text(obj: &Map<String, JsonValue>, key: &str) -> Result<String, String> {
    match obj.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(format!("missing '{key}'")),
    }
}

fn optional_text(obj: &Map<String, JsonValue>, key: &str) -> String {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Normalize a reference library into `(exercise, pose)` pairs.
pub fn parse_reference_library(
    value: JsonValue,
) -> Result<Vec<(String, ReferencePose)>, JsonError> {
    let obj = match value {
        JsonValue::Object(obj) => obj,
        _ => return Err(JsonError::NotALibrary),
    };
    let mut out = Vec::with_capacity(obj.len());
    for (exercise, pose_json) in obj {
        let entries = match pose_json {
            JsonValue::Object(entries) => entries,
            _ => {
                return Err(JsonError::InvalidReference {
                    exercise,
                    reason: "pose is not an object".to_string(),
                })
            }
        };
        let mut pose = ReferencePose::new();
        for (articulation, raw) in entries {
            let Some(v) = parse_number(&raw) else {
                return Err(JsonError::InvalidReference {
                    exercise,
                    reason: format!("non-numeric value for '{articulation}'"),
                });
            };
            pose.insert(articulation, v);
        }
        out.push((exercise, pose));
    }
    Ok(out)
}
