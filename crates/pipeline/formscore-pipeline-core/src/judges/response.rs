//! Parser for the generative judge's reply.
//!
//! Grammar:
//!   reply    := sentence (". " sentence)*      (lines are also sentence breaks)
//!   score    := "score:" ws decimal ["."]       (label is case-insensitive)
//!   feedback := "feedback:" text                (optional, first occurrence)
//!   decimal  := digits [("." | ",") digits]
//!
//! The first sentence starting with the score label wins. Parse failures are
//! reported as [`ParseError`]; mapping them to a fallback is the adapter's job.

use thiserror::Error;

use formscore_api::json::parse_decimal;

const SCORE_LABEL: &str = "score:";
const FEEDBACK_LABEL: &str = "feedback:";

/// Score and feedback extracted from a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AiVerdict {
    pub score: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty response")]
    Empty,
    #[error("no 'score:' sentence in response")]
    MissingScore,
    #[error("score value '{0}' is not a finite number")]
    InvalidScore(String),
}

/// Parse a reply of the form `"Score: <value>. Feedback: <text>"`.
pub fn parse_verdict(text: &str) -> Result<AiVerdict, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let raw = score_sentence(text).ok_or(ParseError::MissingScore)?;
    let value = raw.trim().trim_end_matches('.').trim();
    let score = parse_decimal(value).ok_or_else(|| ParseError::InvalidScore(value.to_string()))?;
    Ok(AiVerdict {
        score,
        feedback: feedback_text(text),
    })
}

/// Text after the score label of the first sentence that starts with it.
fn score_sentence(text: &str) -> Option<&str> {
    text.lines()
        .flat_map(|line| line.split(". "))
        .map(str::trim)
        .find(|sentence| sentence.to_ascii_lowercase().starts_with(SCORE_LABEL))
        .map(|sentence| &sentence[SCORE_LABEL.len()..])
}

/// Text after the first feedback label, or the whole reply when there is none.
fn feedback_text(text: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    match lowered.find(FEEDBACK_LABEL) {
        Some(pos) => {
            let rest = text[pos + FEEDBACK_LABEL.len()..].trim();
            if rest.is_empty() {
                text.to_string()
            } else {
                rest.to_string()
            }
        }
        None => text.to_string(),
    }
}
