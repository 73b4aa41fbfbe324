//! Extraction records and the sentence-keyed mapping readers produce.

use std::collections::{BTreeSet, HashMap};
use std::ops::Index;

/// One (subject, predicate, objects) triple extracted from a sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Source sentence, as written by the reader.
    pub sentence: String,
    /// Predicate (relation) string.
    pub pred: String,
    /// Subject followed by object(s).
    pub args: Vec<String>,
    /// Ranking score. Gold readers use 1.0.
    pub confidence: f64,
    /// Output tags this record has been matched against.
    /// Only grows while a comparison runs.
    pub matched: BTreeSet<String>,
    /// Set when this record is one of several produced by splitting a
    /// conjunctive predicate; siblings with the same `pred` match together.
    pub splits_conjunctions: bool,
}

impl Extraction {
    pub fn new(sentence: impl Into<String>, pred: impl Into<String>, confidence: f64) -> Self {
        Self {
            sentence: sentence.into(),
            pred: pred.into(),
            args: Vec::new(),
            confidence,
            matched: BTreeSet::new(),
            splits_conjunctions: false,
        }
    }

    /// Builder-style argument append.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_splits_conjunctions(mut self, splits: bool) -> Self {
        self.splits_conjunctions = splits;
        self
    }

    pub fn add_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Records that this extraction matched a gold extraction under `tag`.
    pub fn mark_matched(&mut self, tag: &str) {
        self.matched.insert(tag.to_string());
    }

    pub fn is_matched(&self, tag: &str) -> bool {
        self.matched.contains(tag)
    }

    /// Predicate followed by arguments, space separated.
    pub fn bag_of_words(&self) -> String {
        std::iter::once(self.pred.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sentence text -> extractions attributed to it.
///
/// Sentences iterate in first-insertion order, the order readers meet
/// them in the file. Re-inserting a sentence replaces its extractions
/// but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionMap {
    entries: Vec<(String, Vec<Extraction>)>,
    index: HashMap<String, usize>,
}

impl ExtractionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extractions of `sentence`, returning the previous ones.
    pub fn insert(
        &mut self,
        sentence: String,
        extractions: Vec<Extraction>,
    ) -> Option<Vec<Extraction>> {
        match self.index.get(&sentence) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, extractions)),
            None => {
                self.index.insert(sentence.clone(), self.entries.len());
                self.entries.push((sentence, extractions));
                None
            }
        }
    }

    /// Append an extraction under its own sentence.
    pub fn push(&mut self, extraction: Extraction) {
        match self.index.get(&extraction.sentence) {
            Some(&pos) => self.entries[pos].1.push(extraction),
            None => {
                let sentence = extraction.sentence.clone();
                self.insert(sentence, vec![extraction]);
            }
        }
    }

    pub fn get(&self, sentence: &str) -> Option<&Vec<Extraction>> {
        self.index.get(sentence).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, sentence: &str) -> Option<&mut Vec<Extraction>> {
        match self.index.get(sentence) {
            Some(&pos) => Some(&mut self.entries[pos].1),
            None => None,
        }
    }

    pub fn contains_key(&self, sentence: &str) -> bool {
        self.index.contains_key(sentence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Vec<Extraction>> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Extraction>)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl Index<&str> for ExtractionMap {
    type Output = Vec<Extraction>;

    fn index(&self, sentence: &str) -> &Self::Output {
        match self.get(sentence) {
            Some(extractions) => extractions,
            None => panic!("no extractions for sentence {:?}", sentence),
        }
    }
}

impl IntoIterator for ExtractionMap {
    type Item = (String, Vec<Extraction>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Extraction>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Total number of extractions across all sentences.
pub fn count_extractions(map: &ExtractionMap) -> usize {
    map.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_of_words_joins_pred_then_args() {
        let ex = Extraction::new("The cat ate fish.", "ate", 0.9)
            .with_arg("The cat")
            .with_arg("fish");
        assert_eq!(ex.bag_of_words(), "ate The cat fish");
    }

    #[test]
    fn mark_matched_is_append_only() {
        let mut ex = Extraction::new("s", "p", 0.1);
        assert!(!ex.is_matched("out.txt"));
        ex.mark_matched("out.txt");
        ex.mark_matched("out.txt");
        ex.mark_matched("other.txt");
        assert!(ex.is_matched("out.txt"));
        assert_eq!(ex.matched.len(), 2);
    }

    #[test]
    fn map_keeps_first_insertion_order() {
        let mut map = ExtractionMap::new();
        map.push(Extraction::new("zebra", "p", 1.0));
        map.push(Extraction::new("apple", "q", 1.0));
        map.push(Extraction::new("zebra", "r", 1.0));
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["zebra", "apple"]);
        assert_eq!(map["zebra"].len(), 2);
        assert_eq!(map["zebra"][1].pred, "r");
    }

    #[test]
    fn map_insert_replaces_in_place() {
        let mut map = ExtractionMap::new();
        map.insert("a".to_string(), vec![Extraction::new("a", "old", 1.0)]);
        map.insert("b".to_string(), vec![Extraction::new("b", "q", 1.0)]);
        let previous = map.insert("a".to_string(), vec![Extraction::new("a", "new", 1.0)]);
        assert_eq!(previous.unwrap()[0].pred, "old");
        assert_eq!(map["a"][0].pred, "new");
        assert_eq!(map.keys().next().unwrap(), "a");
        assert_eq!(map.len(), 2);
        assert!(map.get_mut("missing").is_none());
    }

    #[test]
    fn count_extractions_sums_sentences() {
        let mut map = ExtractionMap::new();
        map.insert("a".to_string(), vec![Extraction::new("a", "p", 1.0); 3]);
        map.insert("b".to_string(), vec![Extraction::new("b", "q", 1.0)]);
        assert_eq!(count_extractions(&map), 4);
    }
}
