//! Precision/recall curve over ranked confidence scores.

/// Parallel (truth, score) labels collected during a comparison.
/// `truth` entries are always 0 or 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    truth: Vec<u8>,
    scores: Vec<f64>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_true_positive(&mut self, score: f64) {
        self.truth.push(1);
        self.scores.push(score);
    }

    pub fn push_false_positive(&mut self, score: f64) {
        self.truth.push(0);
        self.scores.push(score);
    }

    pub fn truth(&self) -> &[u8] {
        &self.truth
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.truth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.truth.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.truth.iter().filter(|&&t| t == 1).count()
    }

    pub fn negatives(&self) -> usize {
        self.len() - self.positives()
    }
}

/// One operating point of the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub precision: f64,
    pub recall: f64,
    /// Score threshold producing this point; `None` for the terminal
    /// (precision 1, recall 0) point.
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrCurve {
    /// Lowest threshold first, terminal point last.
    pub points: Vec<CurvePoint>,
}

impl PrCurve {
    /// Sweeps every distinct score as a threshold (highest first) and
    /// records precision and recall of the predictions at or above it.
    /// Recall values are scaled by `recall_multiplier`.
    ///
    /// When `labels` holds no positives, raw recall is 1.0 at every
    /// threshold.
    pub fn compute(labels: &Labels, recall_multiplier: f64) -> Self {
        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| labels.scores[b].total_cmp(&labels.scores[a]));

        // Cumulative counts at the last index of each tied-score group.
        let mut thresholds = Vec::new();
        let mut tps: Vec<usize> = Vec::new();
        let mut fps: Vec<usize> = Vec::new();
        let mut tp = 0usize;
        for (rank, &idx) in order.iter().enumerate() {
            tp += labels.truth[idx] as usize;
            let score = labels.scores[idx];
            let group_ends = match order.get(rank + 1) {
                Some(&next) => labels.scores[next].total_cmp(&score).is_ne(),
                None => true,
            };
            if group_ends {
                thresholds.push(score);
                tps.push(tp);
                fps.push(rank + 1 - tp);
            }
        }

        let total_positives = tp;
        let mut points: Vec<CurvePoint> = thresholds
            .iter()
            .zip(tps.iter().zip(fps.iter()))
            .rev()
            .map(|(&threshold, (&tp, &fp))| {
                let predicted = tp + fp;
                let precision = if predicted == 0 {
                    0.0
                } else {
                    tp as f64 / predicted as f64
                };
                let recall = if total_positives == 0 {
                    1.0
                } else {
                    tp as f64 / total_positives as f64
                };
                CurvePoint {
                    precision,
                    recall: recall * recall_multiplier,
                    threshold: Some(threshold),
                }
            })
            .collect();

        points.push(CurvePoint {
            precision: 1.0,
            recall: 0.0,
            threshold: None,
        });

        Self { points }
    }

    /// Points ordered by ascending recall. Ties keep curve order.
    pub fn sorted_by_recall(&self) -> Vec<CurvePoint> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| a.recall.total_cmp(&b.recall));
        sorted
    }

    /// Highest F1 over all points; points with precision + recall == 0
    /// are skipped. 0.0 if no point qualifies.
    pub fn max_f1(&self) -> f64 {
        self.points
            .iter()
            .filter_map(|p| f1(p.precision, p.recall))
            .fold(0.0, f64::max)
    }
}

/// Harmonic mean of precision and recall, `None` when undefined.
pub fn f1(precision: f64, recall: f64) -> Option<f64> {
    let denom = precision + recall;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(2.0 * precision * recall / denom)
}
