//! Validation of model replies.
//!
//! Replies are free text that is supposed to contain JSON. Everything here
//! degrades to documented defaults instead of failing: a malformed reply for
//! one batch must not abort a whole analysis run.

use crate::models::{Classification, OverallSummary, Sentiment};
use crate::utils::json_extractor::extract_json;
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_SENTIMENT: Sentiment = Sentiment::Neutral;
pub const DEFAULT_CONFIDENCE: f64 = 0.75;
pub const SUMMARY_PARSE_ERROR: &str = "Summary unavailable (parse error).";

/// Parse a batch reply into one classification per entry.
///
/// A reply that is not a JSON array yields `Neutral`/0.75 for every id in
/// `expected_ids`. Entries without a usable id are dropped.
pub fn parse_batch_classification(text: &str, expected_ids: &[i64]) -> Vec<Classification> {
    let value = match extract_json(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, reply = %text, "Could not parse classification batch, using defaults");
            return default_classifications(expected_ids);
        }
    };

    match value {
        Value::Array(entries) => entries.iter().filter_map(classification_from_entry).collect(),
        other => {
            warn!(reply = %other, "Classification batch is not a JSON array, using defaults");
            default_classifications(expected_ids)
        }
    }
}

/// Parse a single-comment reply; accepts an object or a one-element array
pub fn parse_single_classification(text: &str, id: i64) -> Classification {
    let entry = match extract_json(text) {
        Ok(Value::Array(mut entries)) if !entries.is_empty() => entries.remove(0),
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!(comment_id = id, reply = %other, "Unexpected classification shape, using defaults");
            return default_classification(id);
        }
        Err(e) => {
            warn!(comment_id = id, error = %e, "Could not parse classification, using defaults");
            return default_classification(id);
        }
    };

    // the prompt names exactly one comment, so the id is known regardless of what came back
    match read_entry(&entry) {
        Some((_, sentiment, confidence)) => Classification { id, sentiment, confidence },
        None => default_classification(id),
    }
}

/// Parse the draft-level summary object; missing keys become empty values
pub fn parse_overall_summary(text: &str) -> OverallSummary {
    let obj = match extract_json(text) {
        Ok(Value::Object(obj)) => obj,
        Ok(other) => {
            warn!(reply = %other, "Overall summary is not a JSON object");
            return summary_parse_error();
        }
        Err(e) => {
            warn!(error = %e, reply = %text, "Could not parse overall summary");
            return summary_parse_error();
        }
    };

    OverallSummary {
        draft_summary: string_field(&obj, "draft_summary"),
        top_themes: obj
            .get("top_themes")
            .and_then(Value::as_array)
            .map(|themes| {
                themes
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        priority_recommendation: string_field(&obj, "priority_recommendation"),
        stakeholder_suggestions: obj
            .get("stakeholder_suggestions")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    }
}

/// Summary recorded when the reply could not be read
pub fn summary_parse_error() -> OverallSummary {
    OverallSummary {
        draft_summary: SUMMARY_PARSE_ERROR.to_string(),
        stakeholder_suggestions: Value::Object(Map::new()),
        ..Default::default()
    }
}

fn default_classification(id: i64) -> Classification {
    Classification {
        id,
        sentiment: DEFAULT_SENTIMENT,
        confidence: DEFAULT_CONFIDENCE,
    }
}

fn default_classifications(ids: &[i64]) -> Vec<Classification> {
    ids.iter().map(|&id| default_classification(id)).collect()
}

/// Sentiment and confidence of one reply entry, with its id when it has a usable one
fn read_entry(entry: &Value) -> Option<(Option<i64>, Sentiment, f64)> {
    let obj = entry.as_object()?;
    let id = obj.get("id").and_then(parse_id);

    let sentiment = obj
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::from_label)
        .unwrap_or(DEFAULT_SENTIMENT);

    let confidence = obj
        .get("confidence")
        .and_then(parse_number)
        .map(normalize_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    Some((id, sentiment, confidence))
}

fn classification_from_entry(entry: &Value) -> Option<Classification> {
    let (id, sentiment, confidence) = read_entry(entry)?;
    Some(Classification {
        id: id?,
        sentiment,
        confidence,
    })
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Clamp to [0, 1] and round to two decimals
fn normalize_confidence(raw: f64) -> f64 {
    if raw.is_nan() {
        return DEFAULT_CONFIDENCE;
    }
    (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
