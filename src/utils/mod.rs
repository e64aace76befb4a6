// Utility functions

pub mod json_extractor;

use crate::types::*;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_BREAK_REGEX: Regex = Regex::new(r"\r\n|\r|\n").unwrap();
}

/// Validates a value against a constraint and returns an error if it fails
pub fn validate<T, F>(
    value: T,
    constraint: F,
    error_message: impl Into<String>,
) -> ConsultResult<T>
where
    F: FnOnce(&T) -> bool,
{
    if constraint(&value) {
        Ok(value)
    } else {
        Err(ConsultError::Validation(error_message.into()))
    }
}

/// Validates a range constraint for numeric values
pub fn validate_range<T>(
    value: T,
    min: T,
    max: T,
    param_name: &str,
) -> ConsultResult<T>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    validate(
        value,
        |&v| v >= min && v <= max,
        format!("{} must be between {} and {}, but got {}", param_name, min, max, value),
    )
}

/// Validates a string against common constraints
pub struct StringValidator;

impl StringValidator {
    /// Validates that a string is not blank
    pub fn not_empty(value: impl Into<String>, param_name: &str) -> ConsultResult<String> {
        let value = value.into();
        validate(
            value,
            |s| !s.trim().is_empty(),
            format!("{} cannot be empty", param_name),
        )
    }
}

/// Keep at most `max_chars` characters of `text`.
///
/// Counts chars rather than bytes so multi-byte text is never cut mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Replace every line break with a single space
pub fn collapse_newlines(text: &str) -> String {
    LINE_BREAK_REGEX.replace_all(text, " ").into_owned()
}
