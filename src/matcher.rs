//! Matching policies deciding whether a predicted extraction is
//! equivalent to a gold one.
//!
//! The comparison engine only sees the [`Matcher`] trait, so any closure
//! with the right shape can stand in for the built-in policies.

use crate::extraction::Extraction;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Default coverage a predicted extraction must exceed to match.
pub const DEFAULT_LEXICAL_THRESHOLD: f64 = 0.5;

/// Decides equivalence between one gold and one predicted extraction.
pub trait Matcher {
    fn matches(
        &self,
        gold: &Extraction,
        predicted: &Extraction,
        ignore_stopwords: bool,
        ignore_case: bool,
    ) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Extraction, &Extraction, bool, bool) -> bool,
{
    fn matches(
        &self,
        gold: &Extraction,
        predicted: &Extraction,
        ignore_stopwords: bool,
        ignore_case: bool,
    ) -> bool {
        self(gold, predicted, ignore_stopwords, ignore_case)
    }
}

/// Built-in policy selector, used by the config file and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Bag-of-words coverage over predicate and arguments.
    #[default]
    Lexical,
    /// Predicates must agree.
    Predicate,
    /// Bag-of-words coverage over arguments only.
    Argument,
}

impl MatchPolicy {
    /// Build the matcher for this policy.
    pub fn build(
        self,
        lexical_threshold: f64,
        argument_threshold: f64,
        extra_stopwords: &[String],
    ) -> Box<dyn Matcher> {
        let stopwords = Stopwords::with_extra(extra_stopwords);
        match self {
            MatchPolicy::Lexical => Box::new(LexicalMatcher {
                threshold: lexical_threshold,
                stopwords,
            }),
            MatchPolicy::Predicate => Box::new(PredicateMatcher { stopwords }),
            MatchPolicy::Argument => Box::new(ArgumentMatcher {
                threshold: argument_threshold,
                stopwords,
            }),
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchPolicy::Lexical => "lexical",
            MatchPolicy::Predicate => "predicate",
            MatchPolicy::Argument => "argument",
        };
        f.write_str(name)
    }
}

// English stopwords, all lowercase. Tokens are compared as they are, so a
// capitalized token only hits the list once case is folded.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

fn builtin_stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Built-in stopword list plus any configured additions.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    extra: HashSet<String>,
}

impl Stopwords {
    /// Extra words are lowercased to sit alongside the built-in list.
    pub fn with_extra(extra: &[String]) -> Self {
        Self {
            extra: extra.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Exact lookup. Callers that want case-insensitive filtering fold the
    /// token first, as [`Stopwords::tokenize`] does under `ignore_case`.
    pub fn contains(&self, token: &str) -> bool {
        builtin_stopwords().contains(token) || self.extra.contains(token)
    }

    /// Whitespace tokenization with optional lowercasing and stopword removal.
    /// If removal would leave nothing, the unfiltered tokens are returned.
    pub fn tokenize(&self, text: &str, ignore_stopwords: bool, ignore_case: bool) -> Vec<String> {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| if ignore_case { t.to_lowercase() } else { t.to_string() })
            .collect();
        if !ignore_stopwords {
            return tokens;
        }
        let filtered: Vec<String> = tokens
            .iter()
            .filter(|t| !self.contains(t))
            .cloned()
            .collect();
        if filtered.is_empty() {
            tokens
        } else {
            filtered
        }
    }
}

/// Share of `reference` tokens that occur anywhere in `candidate`.
pub fn coverage(reference: &[String], candidate: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let candidate: HashSet<&str> = candidate.iter().map(String::as_str).collect();
    let covered = reference
        .iter()
        .filter(|t| candidate.contains(t.as_str()))
        .count();
    covered as f64 / reference.len() as f64
}

/// Matches when the predicted bag of words covers more than `threshold`
/// of the gold bag of words. Lenient toward long predictions.
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    pub threshold: f64,
    pub stopwords: Stopwords,
}

impl Default for LexicalMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LEXICAL_THRESHOLD,
            stopwords: Stopwords::default(),
        }
    }
}

impl Matcher for LexicalMatcher {
    fn matches(
        &self,
        gold: &Extraction,
        predicted: &Extraction,
        ignore_stopwords: bool,
        ignore_case: bool,
    ) -> bool {
        let gold_tokens = self
            .stopwords
            .tokenize(&gold.bag_of_words(), ignore_stopwords, ignore_case);
        let predicted_tokens = self
            .stopwords
            .tokenize(&predicted.bag_of_words(), ignore_stopwords, ignore_case);
        coverage(&gold_tokens, &predicted_tokens) > self.threshold
    }
}

/// Matches when both predicates reduce to the same token sequence.
#[derive(Debug, Clone, Default)]
pub struct PredicateMatcher {
    pub stopwords: Stopwords,
}

impl Matcher for PredicateMatcher {
    fn matches(
        &self,
        gold: &Extraction,
        predicted: &Extraction,
        ignore_stopwords: bool,
        ignore_case: bool,
    ) -> bool {
        let gold_pred = self.stopwords.tokenize(&gold.pred, ignore_stopwords, ignore_case);
        let predicted_pred = self
            .stopwords
            .tokenize(&predicted.pred, ignore_stopwords, ignore_case);
        gold_pred == predicted_pred
    }
}

/// Lexical coverage restricted to the arguments.
#[derive(Debug, Clone)]
pub struct ArgumentMatcher {
    pub threshold: f64,
    pub stopwords: Stopwords,
}

impl Default for ArgumentMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LEXICAL_THRESHOLD,
            stopwords: Stopwords::default(),
        }
    }
}

impl Matcher for ArgumentMatcher {
    fn matches(
        &self,
        gold: &Extraction,
        predicted: &Extraction,
        ignore_stopwords: bool,
        ignore_case: bool,
    ) -> bool {
        let gold_args = self
            .stopwords
            .tokenize(&gold.args.join(" "), ignore_stopwords, ignore_case);
        let predicted_args = self
            .stopwords
            .tokenize(&predicted.args.join(" "), ignore_stopwords, ignore_case);
        coverage(&gold_args, &predicted_args) > self.threshold
    }
}
