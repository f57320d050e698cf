//! Match policies for scoring predictions against ground truth

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a prediction is compared against its ground-truth label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Full string identity after normalization
    #[default]
    Exact,
    /// Ground truth appears as a substring of the prediction. Asymmetric:
    /// the label is the short category keyword, the prediction the long
    /// free-form output.
    Contains,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" => Ok(Self::Contains),
            other => Err(format!(
                "Unknown match mode: {}. Valid options: exact, contains",
                other
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Contains => write!(f, "contains"),
        }
    }
}

/// Compare an already-normalized prediction against an already-normalized
/// ground truth. Normalization is the caller's responsibility so the policy
/// stays in one place.
///
/// An empty ground truth never matches under either mode: an empty label
/// carries no information, and under `contains` it would otherwise match
/// every prediction.
pub fn matches(pred: &str, gt: &str, mode: MatchMode) -> bool {
    if gt.is_empty() {
        return false;
    }
    match mode {
        MatchMode::Exact => pred == gt,
        MatchMode::Contains => pred.contains(gt),
    }
}
