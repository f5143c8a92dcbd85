//! Extractive article summaries.
//!
//! Sentences are scored by how often their content words occur across the
//! whole article, with words from the title counting double, divided by the
//! sentence's word count so long sentences do not win by size alone. The best
//! `n` sentences are returned in the order they appear in the article.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]["')\]]?\s+"#).expect("valid sentence regex"));
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").expect("valid word regex"));

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "said", "same", "says", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "year", "you", "your",
];

/// Sentences shorter than this are usually captions or bylines.
const MIN_SENTENCE_WORDS: usize = 5;

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

fn content_words(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() > 1 && !STOPWORD_SET.contains(w.as_str()))
        .collect()
}

/// Split prose into trimmed sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.split_whitespace().join(" ");
        let mut start = 0;
        for m in SENTENCE_END.find_iter(&paragraph) {
            let sentence = paragraph[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = m.end();
        }
        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
    }
    sentences
}

/// Up to `n` of the highest-scoring sentences of `body`, in article order,
/// joined by spaces. Empty when the body has no usable sentence.
pub fn summarize(title: &str, body: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let sentences: Vec<String> = split_sentences(body)
        .into_iter()
        .filter(|s| WORD.find_iter(s).count() >= MIN_SENTENCE_WORDS)
        .collect();
    if sentences.is_empty() {
        return String::new();
    }

    let mut frequency: HashMap<String, f64> = HashMap::new();
    for word in sentences.iter().flat_map(|s| content_words(s)) {
        *frequency.entry(word).or_default() += 1.0;
    }
    let title_words: HashSet<String> = content_words(title).into_iter().collect();

    let scored = sentences.iter().enumerate().map(|(i, sentence)| {
        let words = content_words(sentence);
        let total: f64 = words
            .iter()
            .map(|w| {
                let f = frequency.get(w).copied().unwrap_or(0.0);
                if title_words.contains(w) { f * 2.0 } else { f }
            })
            .sum();
        let length = WORD.find_iter(sentence).count().max(1) as f64;
        (i, total / length)
    });

    scored
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)))
        .take(n)
        .map(|(i, _)| i)
        .sorted()
        .map(|i| sentences[i].as_str())
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "Apple reported record quarterly revenue driven by strong iPhone demand in China. \
The weather in Cupertino was mild on Tuesday afternoon for most residents. \
Analysts said Apple revenue growth beat expectations as iPhone sales climbed.\n\n\
Shares rose after hours. \
Apple also announced a larger buyback program and raised its dividend for shareholders.";

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("One sentence here. Another one! A third? Trailing text");
        assert_eq!(
            sentences,
            vec!["One sentence here.", "Another one!", "A third?", "Trailing text"]
        );
    }

    #[test]
    fn keeps_top_sentences_in_article_order() {
        let summary = summarize("Apple revenue beats on iPhone demand", BODY, 2);
        let first = summary.find("record quarterly revenue").unwrap();
        let second = summary.find("Analysts said").unwrap();
        assert!(first < second);
        assert!(!summary.contains("weather"));
    }

    #[test]
    fn short_fragments_are_ignored() {
        let summary = summarize("Apple", BODY, 5);
        assert!(!summary.contains("Shares rose"));
        assert!(summary.contains("buyback"));
    }

    #[test]
    fn empty_or_tiny_body_gives_empty_summary() {
        assert_eq!(summarize("Title", "", 3), "");
        assert_eq!(summarize("Title", "Subscribe now.", 3), "");
        assert_eq!(summarize("Title", BODY, 0), "");
    }
}
