//! Reply contract enforcement.
//!
//! The model's output is untrusted text until it survives every check here.
//! Validation is structural only: the four required keys must exist with
//! the right shapes and `confidence` must sit inside [0.0, 1.0]. What the
//! model actually *said* is never judged.

use crate::config::Mode;
use crate::error::ValidationError;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Checked in this order; the first missing key names the failure.
const REQUIRED_KEYS: [&str; 4] = ["summary", "observations", "recommendations", "confidence"];

/// The pipeline's only trusted output entity. Constructed exactly once per
/// successful run, immutable thereafter. Field order here is the key order
/// of the rendered document.
#[derive(Debug, Serialize)]
pub struct ValidatedResult {
    pub mode: Mode,
    pub model: String,
    pub input_chars: usize,
    pub truncated: bool,
    pub summary: String,
    pub observations: Vec<Value>,
    pub recommendations: Vec<Value>,
    pub confidence: f64,
    pub timestamp: String,
}

/// Parse and validate a raw model reply against the response contract.
///
/// `observations` and `recommendations` pass through unmodified — there is
/// deliberately no recursive schema on list contents.
pub fn validate(
    raw_text: &str,
    mode: Mode,
    model: &str,
    input_chars: usize,
    truncated: bool,
) -> Result<ValidatedResult, ValidationError> {
    let data: Value = serde_json::from_str(raw_text).map_err(|_| ValidationError::NotJson)?;

    let map = match data.as_object() {
        Some(map) => map,
        // A non-object reply can't contain any key; report the first.
        None => return Err(ValidationError::MissingKey(REQUIRED_KEYS[0])),
    };

    for key in REQUIRED_KEYS {
        if !map.contains_key(key) {
            return Err(ValidationError::MissingKey(key));
        }
    }

    let confidence = match &map["confidence"] {
        Value::Number(n) => n.as_f64().ok_or(ValidationError::ConfidenceNotNumeric)?,
        _ => return Err(ValidationError::ConfidenceNotNumeric),
    };
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ValidationError::ConfidenceOutOfBounds);
    }

    let summary = map["summary"]
        .as_str()
        .ok_or(ValidationError::WrongType {
            key: "summary",
            expected: "a string",
        })?
        .to_string();

    let observations = sequence(&map["observations"], "observations")?;
    let recommendations = sequence(&map["recommendations"], "recommendations")?;

    Ok(ValidatedResult {
        mode,
        model: model.to_string(),
        input_chars,
        truncated,
        summary,
        observations,
        recommendations,
        confidence,
        timestamp: now_utc(),
    })
}

fn sequence(value: &Value, key: &'static str) -> Result<Vec<Value>, ValidationError> {
    value
        .as_array()
        .cloned()
        .ok_or(ValidationError::WrongType {
            key,
            expected: "a list",
        })
}

/// ISO-8601 UTC with a trailing `Z`.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
