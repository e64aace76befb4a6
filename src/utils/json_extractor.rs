//! JSON extraction utilities
//!
//! Models are asked for bare JSON but often wrap it in Markdown fences or add
//! a sentence before it. Extraction runs these strategies in order:
//! 1. Strip every ```json / ``` marker and parse what is left
//! 2. Parse the first `[...]` span found in the text
//! 3. Parse the first `{...}` span found in the text

use crate::types::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref CODE_FENCE_REGEX: Regex = Regex::new(r"(?i)```(?:json)?").unwrap();
    static ref JSON_OBJECT_REGEX: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
    static ref JSON_ARRAY_REGEX: Regex = Regex::new(r"\[[\s\S]*\]").unwrap();
}

/// Remove Markdown code-fence markers and surrounding whitespace
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE_REGEX.replace_all(text, "").trim().to_string()
}

/// Extract a JSON value from free model text.
///
/// Returns the first successful parse across the strategies above, or a
/// `Parse` error carrying the original text.
pub fn extract_json(text: &str) -> ConsultResult<Value> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(ConsultError::parse_error("Model returned no text", Some(text.to_string())));
    }

    parse_whole(&cleaned)
        .or_else(|_| parse_span(&JSON_ARRAY_REGEX, &cleaned))
        .or_else(|_| parse_span(&JSON_OBJECT_REGEX, &cleaned))
        .map_err(|e| match e {
            ConsultError::Parse { message, .. } => {
                ConsultError::parse_error(message, Some(text.to_string()))
            }
            other => other,
        })
}

fn parse_whole(cleaned: &str) -> ConsultResult<Value> {
    Ok(serde_json::from_str(cleaned)?)
}

fn parse_span(pattern: &Regex, cleaned: &str) -> ConsultResult<Value> {
    let found = pattern
        .find(cleaned)
        .ok_or_else(|| ConsultError::parse_error("No JSON content found in response", None))?;
    Ok(serde_json::from_str(found.as_str())?)
}
