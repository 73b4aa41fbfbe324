//! Sentence key normalization.
//!
//! Gold and predicted files rarely agree on tokenization: one side may
//! write `-LRB-` where the other writes `(`, or split punctuation off
//! with spaces. Both mappings are re-keyed with [`normalize_key`] before
//! comparison so those differences don't hide a sentence.

use crate::extraction::ExtractionMap;
use regex::Regex;
use std::sync::OnceLock;

/// Penn Treebank bracket escapes as (unescaped, escaped) pairs.
pub const PTB_ESCAPES: [(&str, &str); 6] = [
    ("(", "-LRB-"),
    (")", "-RRB-"),
    ("[", "-LSB-"),
    ("]", "-RSB-"),
    ("{", "-LCB-"),
    ("}", "-RCB-"),
];

/// ASCII punctuation (the same 32 characters as POSIX `[:punct:]`).
fn punct_regex() -> &'static Regex {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    PUNCT.get_or_init(|| Regex::new(r"[[:punct:]]").expect("Invalid regex pattern"))
}

pub fn ptb_escape(s: &str) -> String {
    PTB_ESCAPES
        .iter()
        .fold(s.to_string(), |acc, &(plain, escaped)| acc.replace(plain, escaped))
}

pub fn ptb_unescape(s: &str) -> String {
    PTB_ESCAPES
        .iter()
        .fold(s.to_string(), |acc, &(plain, escaped)| acc.replace(escaped, plain))
}

pub fn remove_punct(s: &str) -> String {
    punct_regex().replace_all(s, "").into_owned()
}

/// Canonical lookup key: whitespace removed, PTB brackets unescaped,
/// punctuation stripped.
pub fn normalize_key(sentence: &str) -> String {
    let compact: String = sentence.chars().filter(|c| !c.is_whitespace()).collect();
    remove_punct(&ptb_unescape(&compact))
}

/// Re-keys a mapping by [`normalize_key`]. Extraction lists are kept as
/// they are; when two raw sentences collapse onto one key, the one
/// inserted last wins.
pub fn normalize_map(map: ExtractionMap) -> ExtractionMap {
    let mut normalized = ExtractionMap::new();
    for (sentence, extractions) in map {
        let key = normalize_key(&sentence);
        if normalized.insert(key, extractions).is_some() {
            log::debug!("Sentence key collision after normalization, keeping {:?}", sentence);
        }
    }
    normalized
}
