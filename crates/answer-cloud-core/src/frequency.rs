//! Word-frequency analysis of free-text answers.
//!
//! All answers are joined, cleaned, segmented, and filtered into a ranked
//! table of at most [`LayoutConfig::max_words`] entries. Counts are keyed by
//! the lowercased token, so `Cat`, `CAT` and `cat` are one word.
//!
//! English words are counted from the raw text by a dedicated `[a-zA-Z]{2,}`
//! pass. Segments made purely of ASCII letters are therefore not counted a
//! second time from the segmenter output.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::segment::{Segmenter, split_whitespace};
use crate::stopwords::Stopwords;

/// Everything that is not a CJK ideograph, ASCII letter, ASCII digit, or whitespace.
static NON_WORD_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x{4e00}-\x{9fa5}a-zA-Z0-9\s]").expect("valid regex"));

/// Runs of two or more ASCII letters.
static ENGLISH_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]{2,}").expect("valid regex"));

/// One free-text answer submitted by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    /// The answer text.
    pub content: String,
}

impl Answer {
    /// Create an answer from text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl From<&str> for Answer {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Answer {
    fn from(content: String) -> Self {
        Self { content }
    }
}

/// A ranked word and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordFrequencyEntry {
    /// Lowercased word.
    pub word: String,
    /// Occurrences after filtering.
    pub count: usize,
    /// `count` divided by the top entry's count, in `(0, 1]`.
    pub normalized_frequency: f64,
}

/// Frequency table plus how it was produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrequencyReport {
    /// Ranked entries, highest count first.
    pub entries: Vec<WordFrequencyEntry>,
    /// Candidate tokens considered before filtering.
    pub candidates: usize,
    /// Distinct words that survived filtering, before the cap.
    pub distinct_words: usize,
    /// Whether whitespace splitting stood in for the segmenter.
    pub segmentation_fallback: bool,
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_cjk(c)
}

/// Apply the per-token filters. Returns the counting key for tokens that pass.
fn accept_token(token: &str, stopwords: &Stopwords, config: &LayoutConfig) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    let chars = trimmed.chars().count();
    if chars < config.min_word_length {
        return None;
    }
    if chars < 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if stopwords.is_stopword(trimmed) {
        return None;
    }
    if !config.include_numbers && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !trimmed.chars().any(is_word_char) {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Rank the words in `answers`.
///
/// `segmenter` of `None` means no segmenter is available; whitespace splitting
/// is used instead, as it is when the segmenter returns an error.
pub fn analyze(
    answers: &[Answer],
    segmenter: Option<&dyn Segmenter>,
    stopwords: &Stopwords,
    config: &LayoutConfig,
) -> Vec<WordFrequencyEntry> {
    analyze_detailed(answers, segmenter, stopwords, config).entries
}

/// Like [`analyze`], reporting whether segmentation fell back.
#[tracing::instrument(skip_all, fields(answers = answers.len()))]
pub fn analyze_detailed(
    answers: &[Answer],
    segmenter: Option<&dyn Segmenter>,
    stopwords: &Stopwords,
    config: &LayoutConfig,
) -> FrequencyReport {
    if answers.is_empty() {
        return FrequencyReport::default();
    }

    let joined = answers
        .iter()
        .map(|a| a.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned = NON_WORD_CHARS.replace_all(&joined, " ");

    let (segments, segmentation_fallback) = match segmenter {
        Some(segmenter) => match segmenter.cut(&cleaned, true) {
            Ok(segments) => (segments, false),
            Err(err) => {
                tracing::warn!(
                    backend = segmenter.name(),
                    error = %err,
                    "segmentation failed, splitting on whitespace"
                );
                (split_whitespace(&cleaned), true)
            }
        },
        None => (split_whitespace(&cleaned), true),
    };

    let candidates: Vec<String> = segments
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .filter(|s| !s.trim().chars().all(|c| c.is_ascii_alphabetic()))
        .chain(
            ENGLISH_WORD
                .find_iter(&joined)
                .map(|m| m.as_str().to_lowercase()),
        )
        .collect();

    // Insertion order doubles as first-appearance order for tie-breaking.
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for token in &candidates {
        let Some(key) = accept_token(token, stopwords, config) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    let distinct_words = counts.len();
    counts.retain(|(_, count)| *count >= config.min_frequency);
    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(config.max_words);

    let Some(&(_, top)) = counts.first() else {
        tracing::debug!(candidates = candidates.len(), "no words left after filtering");
        return FrequencyReport {
            entries: Vec::new(),
            candidates: candidates.len(),
            distinct_words,
            segmentation_fallback,
        };
    };

    let entries: Vec<WordFrequencyEntry> = counts
        .into_iter()
        .map(|(word, count)| WordFrequencyEntry {
            word,
            count,
            normalized_frequency: count as f64 / top as f64,
        })
        .collect();

    tracing::debug!(
        candidates = candidates.len(),
        distinct_words,
        ranked = entries.len(),
        "frequency analysis complete"
    );

    FrequencyReport {
        entries,
        candidates: candidates.len(),
        distinct_words,
        segmentation_fallback,
    }
}
