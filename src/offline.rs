//! Deterministic stand-in for the model, used when no API key is configured.
//!
//! Classification is a keyword scan; negative keywords win over positive ones.

use crate::client::Generation;
use crate::models::Sentiment;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

lazy_static! {
    static ref NEGATIVE_WORDS: Regex = Regex::new(
        r"(?i)\b(?:concerns?|concerned|risks?|risky|oppos(?:e|ed|es|ing|ition)|against|problems?|problematic|harm(?:s|ed|ful)?)\b"
    )
    .unwrap();
    static ref POSITIVE_WORDS: Regex = Regex::new(
        r"(?i)\b(?:support(?:s|ed|ive)?|benefits?|beneficial|welcome[sd]?|agree[sd]?|improve[sd]?|improvement)\b"
    )
    .unwrap();
    static ref COMMENT_LINE_REGEX: Regex = Regex::new(r#"(?m)^(?:\d+\) )?ID:(\d+) "(.*)"$"#).unwrap();
    static ref SUMMARY_HEADER_REGEX: Regex = Regex::new(r"(?m)^TOTAL_COMMENTS: \d+$").unwrap();
}

/// Keyword verdict for a piece of text; whole words only
pub fn classify_text(text: &str) -> (Sentiment, f64) {
    if NEGATIVE_WORDS.is_match(text) {
        (Sentiment::Negative, 0.9)
    } else if POSITIVE_WORDS.is_match(text) {
        (Sentiment::Positive, 0.9)
    } else {
        (Sentiment::Neutral, 0.85)
    }
}

/// Whether `prompt` asks for the draft-level summary.
///
/// Keyed on the `TOTAL_COMMENTS:` header line, which comment text cannot
/// produce because newlines inside comments are collapsed.
pub fn is_summary_prompt(prompt: &str) -> bool {
    SUMMARY_HEADER_REGEX.is_match(prompt)
}

/// Answer a prompt the way the model is asked to
pub fn respond(prompt: &str) -> Generation {
    let reply = if is_summary_prompt(prompt) {
        mock_summary(prompt)
    } else {
        let entries: Vec<Value> = COMMENT_LINE_REGEX
            .captures_iter(prompt)
            .filter_map(|caps| {
                let id: i64 = caps[1].parse().ok()?;
                let (sentiment, confidence) = classify_text(&caps[2]);
                Some(json!({ "id": id, "sentiment": sentiment, "confidence": confidence }))
            })
            .collect();

        if entries.is_empty() {
            let (sentiment, confidence) = classify_text(prompt);
            json!({ "sentiment": sentiment, "confidence": confidence })
        } else {
            Value::Array(entries)
        }
    };

    let text = reply.to_string();
    let raw = json!({
        "mock": true,
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }],
    });

    Generation { text, raw }
}

fn mock_summary(prompt: &str) -> Value {
    let (leaning, _) = classify_text(prompt);
    json!({
        "draft_summary": format!("Offline summary: comments lean {}.", leaning.as_str().to_lowercase()),
        "top_themes": ["Implementation timeline", "Compliance cost"],
        "priority_recommendation": "Review the most frequently raised concerns before finalising the draft.",
        "stakeholder_suggestions": {
            "citizens": ["Publish a plain-language explainer of the draft."],
            "government": ["Hold a follow-up consultation with affected departments."]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_verdicts() {
        assert_eq!(classify_text("We have a serious CONCERN"), (Sentiment::Negative, 0.9));
        assert_eq!(classify_text("I support this"), (Sentiment::Positive, 0.9));
        assert_eq!(classify_text("No opinion either way"), (Sentiment::Neutral, 0.85));
        assert_eq!(classify_text("I support it but see a risk"), (Sentiment::Negative, 0.9));
        assert_eq!(classify_text("Several concerns and risks remain"), (Sentiment::Negative, 0.9));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(classify_text("I strongly disagree with clause 3"), (Sentiment::Neutral, 0.85));
        assert_eq!(classify_text("Rules for pharmacy licences"), (Sentiment::Neutral, 0.85));
        assert_eq!(classify_text("We agree, it improves access"), (Sentiment::Positive, 0.9));
    }

    #[test]
    fn comment_mentioning_summary_keys_is_still_classified() {
        let prompt = "COMMENTS:\n1) ID:7 \"the draft_summary field should be public, I support it\"";
        let reply: Value = serde_json::from_str(&respond(prompt).text).unwrap();
        assert_eq!(reply[0]["id"], 7);
        assert_eq!(reply[0]["sentiment"], "Positive");
    }

    #[test]
    fn summary_prompt_gets_summary_object() {
        let prompt = "DRAFT_TITLE: Bill\nTOTAL_COMMENTS: 3\nSAMPLE_COMMENTS:\n1) ID:2 \"quoted\"";
        assert!(is_summary_prompt(prompt));
        let reply: Value = serde_json::from_str(&respond(prompt).text).unwrap();
        assert!(reply["draft_summary"].is_string());
        assert!(reply["stakeholder_suggestions"]["citizens"].is_array());
    }

    #[test]
    fn classifies_each_comment_line() {
        let prompt = "COMMENTS:\n1) ID:4 \"this is a risk\"\n2) ID:9 \"great benefit\"";
        let reply: Value = serde_json::from_str(&respond(prompt).text).unwrap();
        assert_eq!(reply[0]["id"], 4);
        assert_eq!(reply[0]["sentiment"], "Negative");
        assert_eq!(reply[1]["id"], 9);
        assert_eq!(reply[1]["sentiment"], "Positive");
    }
}
