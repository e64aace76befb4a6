//! Draft-level statistics computed from the analyzed comment set.
//!
//! Every function here is deterministic: equal input gives equal output,
//! including ordering.

use crate::models::{Comment, Keyword, Sentiment, SentimentCounts};
use crate::prompt::StakeholderExcerpts;
use crate::utils::truncate_chars;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOP_KEYWORDS: usize = 60;
pub const MIN_KEYWORD_CHARS: usize = 3;
pub const SAMPLES_PER_SENTIMENT: usize = 4;
pub const MAX_SAMPLES: usize = 12;
pub const SAMPLE_CHARS: usize = 240;
pub const STAKEHOLDER_EXCERPTS: usize = 5;

pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "from", "are", "was", "have", "has", "not",
    "will", "would", "can", "should", "draft", "section",
];

lazy_static! {
    static ref TOKEN_SPLIT_REGEX: Regex = Regex::new(r"[^\p{L}\p{N}_]+").unwrap();
    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();
}

/// Sampling order: negatives first, then positives, then neutrals
const SAMPLE_PRIORITY: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Positive, Sentiment::Neutral];

/// Everything the overall prompt and the run record need
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total_comments: usize,
    pub sentiment_counts: SentimentCounts,
    pub top_keywords: Vec<Keyword>,
    pub sample_comments: Vec<String>,
    pub stakeholders: StakeholderExcerpts,
}

pub fn aggregate(comments: &[Comment]) -> Aggregate {
    let texts: Vec<&str> = comments.iter().map(|c| c.comment_text.as_str()).collect();
    Aggregate {
        total_comments: comments.len(),
        sentiment_counts: sentiment_counts(comments),
        top_keywords: compute_keywords(&texts, DEFAULT_TOP_KEYWORDS),
        sample_comments: sample_comments(comments),
        stakeholders: stakeholder_excerpts(comments),
    }
}

/// Occurrences per label; comments without a sentiment count as Neutral
pub fn sentiment_counts(comments: &[Comment]) -> SentimentCounts {
    let mut counts = SentimentCounts::new();
    for comment in comments {
        *counts.entry(comment.effective_sentiment()).or_insert(0) += 1;
    }
    counts
}

/// Lower-cased words split on anything that is not a letter, digit or underscore
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_SPLIT_REGEX
        .split(text)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_keyword(token: &str) -> bool {
    token.chars().count() >= MIN_KEYWORD_CHARS && !STOPWORD_SET.contains(token)
}

/// Most frequent keywords, count descending, ties in first-seen order
pub fn compute_keywords<S: AsRef<str>>(texts: &[S], top_k: usize) -> Vec<Keyword> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut keywords: Vec<Keyword> = Vec::new();

    for text in texts {
        for token in tokenize(text.as_ref()).filter(|t| is_keyword(t)) {
            match index.get(&token) {
                Some(&pos) => keywords[pos].count += 1,
                None => {
                    index.insert(token.clone(), keywords.len());
                    keywords.push(Keyword { word: token, count: 1 });
                }
            }
        }
    }

    // sort_by is stable, so equal counts keep first-seen order
    keywords.sort_by(|a, b| b.count.cmp(&a.count));
    keywords.truncate(top_k);
    keywords
}

/// Representative excerpts for the overall prompt.
///
/// Up to four per sentiment in priority order, then backfilled from the full
/// set in order (skipping comments already picked) until twelve.
pub fn sample_comments(comments: &[Comment]) -> Vec<String> {
    let mut picked: Vec<usize> = Vec::with_capacity(MAX_SAMPLES);

    for sentiment in SAMPLE_PRIORITY {
        picked.extend(
            comments
                .iter()
                .enumerate()
                .filter(|(_, c)| c.effective_sentiment() == sentiment)
                .map(|(i, _)| i)
                .take(SAMPLES_PER_SENTIMENT),
        );
    }
    picked.truncate(MAX_SAMPLES);

    if picked.len() < MAX_SAMPLES {
        let already: HashSet<usize> = picked.iter().copied().collect();
        let room = MAX_SAMPLES - picked.len();
        picked.extend((0..comments.len()).filter(|i| !already.contains(i)).take(room));
    }

    picked
        .into_iter()
        .map(|i| truncate_chars(&comments[i].comment_text, SAMPLE_CHARS))
        .collect()
}

/// First few comment texts from citizens and from government stakeholders
pub fn stakeholder_excerpts(comments: &[Comment]) -> StakeholderExcerpts {
    let of_type = |kind: &str| -> Vec<String> {
        comments
            .iter()
            .filter(|c| {
                c.stakeholder_type
                    .as_deref()
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(kind))
            })
            .take(STAKEHOLDER_EXCERPTS)
            .map(|c| c.comment_text.clone())
            .collect()
    };

    StakeholderExcerpts {
        citizens: of_type("citizen"),
        government: of_type("government"),
    }
}
