//! Validation helpers shared by input field consumers.
//!
//! These routines ensure that operator-supplied values obey the declarative
//! constraints attached to a template's input fields, independent of any
//! rendering surface.

use regex::Regex;
use serde_json::Value;

use crate::template::{InputKind, InputValidation};

/// Validate that a candidate value matches the declared input kind.
///
/// Environment references carry the bound environment id as a string; the
/// cross-check against the slot binding itself lives in the engine, which
/// can see binder state.
pub fn validate_value_kind(candidate: &Value, kind: InputKind) -> Result<(), String> {
    match (kind, candidate) {
        (InputKind::Text, Value::String(_)) => Ok(()),
        (InputKind::Number, Value::Number(_)) => Ok(()),
        (InputKind::Boolean, Value::Bool(_)) => Ok(()),
        (InputKind::EnvironmentRef, Value::String(_)) => Ok(()),
        (InputKind::Text, _) => Err("value must be text".to_string()),
        (InputKind::Number, _) => Err("value must be a number".to_string()),
        (InputKind::Boolean, _) => Err("value must be true or false".to_string()),
        (InputKind::EnvironmentRef, _) => Err("value must be an environment id".to_string()),
    }
}

/// Validate a JSON candidate against the declarative field rules.
///
/// - Enumerations must include the candidate.
/// - Patterns, minimum length, and maximum length only apply to strings.
/// - Non-string values are allowed when the validation metadata does not
///   specify string-specific requirements.
pub fn validate_candidate_value(candidate: &Value, validation: &InputValidation) -> Result<(), String> {
    if !validation.allowed_values.is_empty() {
        let matches_allowed_value = validation
            .allowed_values
            .iter()
            .any(|allowed| json_values_match(allowed, candidate));
        if !matches_allowed_value {
            return Err("value is not in the allowed set".to_string());
        }
    }

    match candidate {
        Value::String(text) => {
            if let Some(min_length) = validation.min_length
                && text.chars().count() < min_length
            {
                return Err(format!("value must be at least {} characters", min_length));
            }

            if let Some(max_length) = validation.max_length
                && text.chars().count() > max_length
            {
                return Err(format!("value must be at most {} characters", max_length));
            }

            if let Some(pattern) = &validation.pattern {
                let regex = Regex::new(pattern).map_err(|error| format!("invalid pattern '{}': {}", pattern, error))?;
                if !regex.is_match(text) {
                    return Err(format!("value must match the pattern {}", pattern));
                }
            }
            Ok(())
        }
        other => {
            if validation.pattern.is_some() || validation.min_length.is_some() || validation.max_length.is_some() {
                Err("value must be text to satisfy validation rules".to_string())
            } else if validation.allowed_values.is_empty() || validation.allowed_values.iter().any(|item| item == other) {
                Ok(())
            } else {
                Err("value is not in the allowed set".to_string())
            }
        }
    }
}

fn json_values_match(expected: &Value, candidate: &Value) -> bool {
    if expected == candidate {
        return true;
    }
    match (expected, candidate) {
        (Value::String(expected_text), Value::String(candidate_text)) => expected_text == candidate_text,
        (Value::String(expected_text), other) => expected_text == &other.to_string(),
        (other, Value::String(candidate_text)) => {
            if let Ok(parsed) = serde_json::from_str::<Value>(candidate_text) {
                other == &parsed
            } else {
                other == &Value::String(candidate_text.clone())
            }
        }
        _ => false,
    }
}
