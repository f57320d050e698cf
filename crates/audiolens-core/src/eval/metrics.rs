//! Metric aggregation over per-file match outcomes

use serde::{Deserialize, Serialize};

/// One scored file: raw prediction, raw ground truth, binary outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    /// Path relative to the evaluation root
    pub file: String,
    /// Raw (un-normalized) model output
    pub pred: String,
    /// Raw (un-normalized) ground-truth label
    pub gt: String,
    /// 1 for a match, 0 otherwise
    #[serde(rename = "match")]
    pub matched: u8,
}

/// Aggregate evaluation metrics
///
/// Every file yields exactly one binary outcome, so `count == tp + fp` and
/// false negatives are defined equal to false positives (recall therefore
/// always equals precision in this single-label design).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub count: usize,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl EvaluationSummary {
    /// Recompute the full summary from the detail records. Always derived
    /// fresh, never incrementally mutated, so it cannot drift from the
    /// formulas.
    pub fn from_details(details: &[MatchDetail]) -> Self {
        let tp = details.iter().filter(|d| d.matched == 1).count();
        let fp = details.len() - tp;
        Self::from_counts(tp, fp)
    }

    /// Derive precision/recall/F1 from raw counts. Zero denominators yield
    /// 0.0 rather than an error.
    pub fn from_counts(tp: usize, fp: usize) -> Self {
        let fn_ = fp;
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            count: tp + fp,
            tp,
            fp,
            fn_,
            precision,
            recall,
            f1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(matched: u8) -> MatchDetail {
        MatchDetail {
            file: "f.wav".to_string(),
            pred: String::new(),
            gt: String::new(),
            matched,
        }
    }

    #[test]
    fn test_eight_of_ten() {
        let details: Vec<_> = (0..10).map(|i| detail(u8::from(i < 8))).collect();
        let summary = EvaluationSummary::from_details(&details);
        assert_eq!(summary.count, 10);
        assert_eq!(summary.tp, 8);
        assert_eq!(summary.fp, 2);
        assert_eq!(summary.fn_, 2);
        assert!((summary.precision - 0.8).abs() < 1e-9);
        assert!((summary.recall - 0.8).abs() < 1e-9);
        assert!((summary.f1 - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_is_zeroed_not_nan() {
        let summary = EvaluationSummary::from_details(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.precision, 0.0);
        assert_eq!(summary.recall, 0.0);
        assert_eq!(summary.f1, 0.0);
    }

    #[test]
    fn test_all_wrong() {
        let summary = EvaluationSummary::from_counts(0, 5);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.precision, 0.0);
        assert_eq!(summary.f1, 0.0);
    }

    #[test]
    fn test_count_invariants() {
        for (tp, fp) in [(0, 0), (1, 0), (0, 1), (7, 3), (100, 100)] {
            let s = EvaluationSummary::from_counts(tp, fp);
            assert_eq!(s.count, s.tp + s.fp);
            assert_eq!(s.fn_, s.fp);
            assert_eq!(s.precision, s.recall);
        }
    }

    #[test]
    fn test_json_shape() {
        let summary = EvaluationSummary::from_counts(1, 1);
        let json = serde_json::to_value(summary).expect("serialize");
        for key in ["count", "tp", "fp", "fn", "precision", "recall", "f1"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_detail_json_shape() {
        let json = serde_json::to_value(detail(1)).expect("serialize");
        for key in ["file", "pred", "gt", "match"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["match"], 1);
    }
}
