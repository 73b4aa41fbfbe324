//! Comparison engine: scores a predicted extraction set against the gold
//! set and writes the resulting precision/recall table.

use crate::curve::{Labels, PrCurve};
use crate::error::{BenchError, Result};
use crate::extraction::{count_extractions, ExtractionMap};
use crate::matcher::Matcher;
use crate::normalize::normalize_map;
use crate::readers::Reader;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Gold reference set, loaded once and compared against any number of
/// predicted sets.
#[derive(Debug, Clone)]
pub struct Benchmark {
    gold: ExtractionMap,
}

/// Labels and bookkeeping from one scoring pass.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Output identifier predicted records were matched against.
    pub tag: String,
    pub labels: Labels,
    /// Gold extractions visited, including those of sentences the
    /// predicted set never mentions.
    pub correct_total: usize,
    /// Gold extractions with no matching prediction.
    pub unmatched_count: usize,
    /// Normalized predicted set with its match bookkeeping.
    pub predicted: ExtractionMap,
}

/// Summary of a finished comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub output: String,
    pub gold_total: usize,
    pub unmatched_count: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub recall_multiplier: f64,
    pub max_f1: f64,
    pub curve_points: usize,
}

impl Comparison {
    /// Share of gold extractions that could appear as true positives.
    /// Fails on an empty gold set.
    pub fn recall_multiplier(&self) -> Result<f64> {
        if self.correct_total == 0 {
            return Err(BenchError::EmptyGold);
        }
        Ok((self.correct_total - self.unmatched_count) as f64 / self.correct_total as f64)
    }

    pub fn curve(&self) -> Result<PrCurve> {
        Ok(PrCurve::compute(&self.labels, self.recall_multiplier()?))
    }
}

impl Benchmark {
    pub fn new(gold: ExtractionMap) -> Self {
        Self { gold }
    }

    /// Load the gold set through `reader`.
    pub fn load(reader: &dyn Reader, path: &Path) -> Result<Self> {
        let gold = reader.read(path)?;
        log::info!(
            "Loaded {} gold extractions over {} sentences from {}",
            count_extractions(&gold),
            gold.len(),
            path.display()
        );
        Ok(Self::new(gold))
    }

    pub fn gold(&self) -> &ExtractionMap {
        &self.gold
    }

    /// Match `predicted` against the gold set and collect labels.
    ///
    /// Gold sentences drive the loop, so predicted sentences without a gold
    /// counterpart contribute nothing. Each gold extraction takes the first
    /// predicted extraction the matcher accepts, in file order.
    pub fn score(&self, predicted: ExtractionMap, matcher: &dyn Matcher, tag: &str) -> Comparison {
        let mut predicted = normalize_map(predicted);
        let gold = normalize_map(self.gold.clone());

        let mut labels = Labels::new();
        let mut correct_total = 0usize;
        let mut unmatched_count = 0usize;

        for (sentence, gold_extractions) in gold.iter() {
            let Some(predicted_extractions) = predicted.get_mut(sentence) else {
                // Whole sentence missed by the extractor
                log::debug!("No predictions for sentence {:?}", sentence);
                unmatched_count += gold_extractions.len();
                correct_total += gold_extractions.len();
                continue;
            };

            for gold_ex in gold_extractions {
                correct_total += 1;

                let found = predicted_extractions
                    .iter()
                    .position(|p| matcher.matches(gold_ex, p, true, true));

                let Some(idx) = found else {
                    unmatched_count += 1;
                    continue;
                };

                let hit = &mut predicted_extractions[idx];
                labels.push_true_positive(hit.confidence);
                hit.mark_matched(tag);

                // Conjunction-split siblings share the predicate and count
                // as matched without adding labels.
                if hit.splits_conjunctions {
                    let pred = hit.pred.clone();
                    for other in predicted_extractions.iter_mut() {
                        if other.pred == pred {
                            other.mark_matched(tag);
                        }
                    }
                }
            }

            for ex in predicted_extractions.iter().filter(|ex| !ex.is_matched(tag)) {
                labels.push_false_positive(ex.confidence);
            }
        }

        log::debug!(
            "Scored {}: {} labels, {} gold visited, {} unmatched",
            tag,
            labels.len(),
            correct_total,
            unmatched_count
        );

        Comparison {
            tag: tag.to_string(),
            labels,
            correct_total,
            unmatched_count,
            predicted,
        }
    }

    /// Score `predicted`, write the precision/recall table to `output` and
    /// return a summary. The output path doubles as the match tag.
    pub fn compare(
        &self,
        predicted: ExtractionMap,
        matcher: &dyn Matcher,
        output: &Path,
    ) -> Result<Report> {
        let tag = output.display().to_string();
        let comparison = self.score(predicted, matcher, &tag);
        let recall_multiplier = comparison.recall_multiplier()?;
        let curve = PrCurve::compute(&comparison.labels, recall_multiplier);

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let max_f1 = write_curve(&mut writer, &curve)?;
        writer.flush()?;

        log::info!(
            "Wrote {} curve points to {} (max F1 {:.4})",
            curve.points.len(),
            output.display(),
            max_f1
        );

        Ok(Report {
            output: tag,
            gold_total: comparison.correct_total,
            unmatched_count: comparison.unmatched_count,
            true_positives: comparison.labels.positives(),
            false_positives: comparison.labels.negatives(),
            recall_multiplier,
            max_f1,
            curve_points: curve.points.len(),
        })
    }
}

/// Write the tab-separated table (ascending recall) and the trailing
/// `Maximal F1 score:` line. Returns the maximal F1.
pub fn write_curve<W: Write>(writer: &mut W, curve: &PrCurve) -> std::io::Result<f64> {
    writeln!(writer, "Precision\tRecall")?;
    for point in curve.sorted_by_recall() {
        writeln!(
            writer,
            "{}\t{}",
            format_float(point.precision),
            format_float(point.recall)
        )?;
    }
    let max_f1 = curve.max_f1();
    write!(writer, "Maximal F1 score: {}", format_float(max_f1))?;
    Ok(max_f1)
}

/// Shortest round-trip float text: integral values keep a `.0`, magnitudes
/// below 1e-4 or from 1e16 up use a signed two-digit exponent (`5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{:e}", value);
        let (mantissa, exponent) = match sci.split_once('e') {
            Some(parts) => parts,
            None => return sci,
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }
    let plain = format!("{}", value);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Extraction;
    use crate::matcher::LexicalMatcher;
    use tempfile::TempDir;

    const TAG: &str = "out.txt";

    fn ex(sentence: &str, subject: &str, pred: &str, object: &str, conf: f64) -> Extraction {
        Extraction::new(sentence, pred, conf)
            .with_arg(subject)
            .with_arg(object)
    }

    fn map(entries: Vec<Extraction>) -> ExtractionMap {
        let mut m = ExtractionMap::new();
        for e in entries {
            m.push(e);
        }
        m
    }

    fn cat_benchmark() -> Benchmark {
        Benchmark::new(map(vec![ex("The cat ate fish.", "cat", "ate", "fish", 1.0)]))
    }

    #[test]
    fn end_to_end_one_hit_one_miss() {
        let predicted = map(vec![
            ex("The cat ate fish.", "cat", "ate", "fish", 0.9),
            ex("The cat ate fish.", "dog", "barked", "loudly", 0.3),
        ]);
        let comparison = cat_benchmark().score(predicted, &LexicalMatcher::default(), TAG);

        assert_eq!(comparison.labels.truth(), &[1, 0]);
        assert_eq!(comparison.labels.scores(), &[0.9, 0.3]);
        assert!((comparison.recall_multiplier().unwrap() - 1.0).abs() < 1e-9);

        let curve = comparison.curve().unwrap();
        let at_09 = curve
            .points
            .iter()
            .find(|p| p.threshold == Some(0.9))
            .unwrap();
        assert!((at_09.precision - 1.0).abs() < 1e-9);
        assert!((at_09.recall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sentence_keys_are_normalized() {
        let predicted = map(vec![ex("The cat ate fish .", "cat", "ate", "fish", 0.9)]);
        let comparison = cat_benchmark().score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.labels.truth(), &[1]);
        assert_eq!(comparison.unmatched_count, 0);
    }

    #[test]
    fn missing_sentence_charged_without_labels() {
        let gold = map(vec![
            ex("A", "a1", "p1", "o1", 1.0),
            ex("A", "a2", "p2", "o2", 1.0),
            ex("A", "a3", "p3", "o3", 1.0),
        ]);
        let predicted = map(vec![ex("B", "a1", "p1", "o1", 0.5)]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.correct_total, 3);
        assert_eq!(comparison.unmatched_count, 3);
        // Predicted-only sentence "B" is never visited either.
        assert!(comparison.labels.is_empty());
        assert!((comparison.recall_multiplier().unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn conjunction_split_siblings_marked_matched() {
        let gold = map(vec![ex("S", "John", "eat", "apples", 1.0)]);
        let predicted = map(vec![
            ex("S", "John", "eat", "apples", 0.8).with_splits_conjunctions(true),
            ex("S", "John", "eat", "pears", 0.6).with_splits_conjunctions(true),
        ]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);

        assert_eq!(comparison.labels.truth(), &[1]);
        assert_eq!(comparison.labels.scores(), &[0.8]);
        let preds = &comparison.predicted["S"];
        assert!(preds.iter().all(|p| p.is_matched(TAG)));
    }

    #[test]
    fn without_conjunction_flag_siblings_are_false_positives() {
        let gold = map(vec![ex("S", "John", "eat", "apples", 1.0)]);
        let predicted = map(vec![
            ex("S", "John", "eat", "apples", 0.8),
            ex("S", "John", "eat", "pears", 0.6),
        ]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.labels.truth(), &[1, 0]);
        assert_eq!(comparison.labels.scores(), &[0.8, 0.6]);
    }

    #[test]
    fn first_match_wins_over_better_match() {
        let gold = map(vec![ex("S", "the big cat", "ate", "fish", 1.0)]);
        let predicted = map(vec![
            ex("S", "cat", "ate", "fish", 0.2),
            ex("S", "the big cat", "ate", "fish", 0.9),
        ]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.labels.truth(), &[1, 0]);
        assert_eq!(comparison.labels.scores(), &[0.2, 0.9]);
    }

    #[test]
    fn one_prediction_can_satisfy_several_gold() {
        let gold = map(vec![
            ex("S", "cat", "ate", "fish", 1.0),
            ex("S", "cat", "ate", "fish", 1.0),
        ]);
        let predicted = map(vec![ex("S", "cat", "ate", "fish", 0.7)]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.labels.truth(), &[1, 1]);
        assert_eq!(comparison.unmatched_count, 0);
    }

    #[test]
    fn empty_gold_is_an_error() {
        let bench = Benchmark::new(ExtractionMap::new());
        let predicted = map(vec![ex("S", "cat", "ate", "fish", 0.7)]);
        let comparison = bench.score(predicted.clone(), &LexicalMatcher::default(), TAG);
        assert!(matches!(comparison.recall_multiplier(), Err(BenchError::EmptyGold)));

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("pr.txt");
        let err = bench
            .compare(predicted, &LexicalMatcher::default(), &out)
            .unwrap_err();
        assert!(matches!(err, BenchError::EmptyGold));
        assert!(!out.exists());
    }

    #[test]
    fn compare_writes_table() {
        let predicted = map(vec![
            ex("The cat ate fish.", "cat", "ate", "fish", 0.9),
            ex("The cat ate fish.", "dog", "barked", "loudly", 0.3),
        ]);
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("pr.txt");
        let report = cat_benchmark()
            .compare(predicted, &LexicalMatcher::default(), &out)
            .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "Precision\tRecall\n1.0\t0.0\n0.5\t1.0\n1.0\t1.0\nMaximal F1 score: 1.0"
        );
        assert_eq!(report.true_positives, 1);
        assert_eq!(report.false_positives, 1);
        assert_eq!(report.gold_total, 1);
        assert!((report.max_f1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn compare_reports_unwritable_output() {
        let predicted = map(vec![ex("The cat ate fish.", "cat", "ate", "fish", 0.9)]);
        let out = Path::new("/nonexistent/oiebench/dir/pr.txt");
        let err = cat_benchmark()
            .compare(predicted, &LexicalMatcher::default(), out)
            .unwrap_err();
        assert!(matches!(err, BenchError::Io(_)));
    }

    #[test]
    fn recall_multiplier_discounts_unmatched_gold() {
        let gold = map(vec![
            ex("S", "cat", "ate", "fish", 1.0),
            ex("S", "dog", "chased", "ball", 1.0),
            ex("T", "bird", "sang", "song", 1.0),
            ex("U", "cow", "ate", "grass", 1.0),
        ]);
        let predicted = map(vec![
            ex("S", "cat", "ate", "fish", 0.9),
            ex("T", "bird", "sang", "song", 0.4),
        ]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        assert_eq!(comparison.correct_total, 4);
        assert_eq!(comparison.unmatched_count, 2);
        assert!((comparison.recall_multiplier().unwrap() - 0.5).abs() < 1e-9);
        let curve = comparison.curve().unwrap();
        let max_recall = curve.points.iter().map(|p| p.recall).fold(0.0, f64::max);
        assert!((max_recall - 0.5).abs() < 1e-9);
    }

    #[test]
    fn colliding_gold_sentences_keep_last_inserted() {
        // Both raw sentences normalize to the same key; file order decides.
        let gold = map(vec![
            ex("The cat ate fish .", "cat", "ate", "fish", 1.0),
            ex("The cat ate fish.", "dog", "swam", "lake", 1.0),
        ]);
        let predicted = map(vec![ex("The cat ate fish.", "cat", "ate", "fish", 0.9)]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);

        assert_eq!(comparison.correct_total, 1);
        assert_eq!(comparison.unmatched_count, 1);
        assert_eq!(comparison.labels.truth(), &[0]);
        assert_eq!(comparison.labels.scores(), &[0.9]);
        assert!((comparison.recall_multiplier().unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_input_keeps_labels_parallel() {
        let gold = map(vec![
            ex("S", "cat", "ate", "fish", 1.0),
            ex("S", "dog", "chased", "ball", 1.0),
            ex("T", "bird", "sang", "song", 1.0),
            ex("U", "cow", "ate", "grass", 1.0),
        ]);
        let predicted = map(vec![
            ex("S", "cat", "ate", "fish", 0.9),
            ex("S", "tree", "fell", "down", 0.2),
            ex("T", "bird", "sang", "song", 0.4),
            ex("T", "wind", "blew", "hard", 0.1),
            ex("V", "cat", "ate", "fish", 0.7),
        ]);
        let comparison = Benchmark::new(gold).score(predicted, &LexicalMatcher::default(), TAG);
        let labels = &comparison.labels;

        assert_eq!(labels.truth().len(), labels.scores().len());
        assert!(labels.truth().iter().all(|&t| t == 0 || t == 1));
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.positives(), 2);
        assert_eq!(labels.negatives(), 2);
        assert_eq!(comparison.correct_total, 4);
        assert_eq!(comparison.unmatched_count, 2);
        // Sentence "V" has no gold counterpart and is never labelled.
        assert!(!comparison.predicted["V"][0].is_matched(TAG));
    }

    #[test]
    fn format_float_matches_shortest_repr() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(2.0 / 3.0), "0.6666666666666666");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00005), "5e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(1e16), "1e+16");
    }
}
