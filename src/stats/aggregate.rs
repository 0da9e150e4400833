//! Average and median summaries

use crate::InferredPlayerRecord;
use serde::{Deserialize, Serialize};

/// Average and median of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub samples: usize,
    pub average: f64,
    pub median: f64,
}

impl Summary {
    /// Summarize values, or `None` for an empty sample
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let samples = values.len();
        let average = values.iter().sum::<f64>() / samples as f64;
        let mid = samples / 2;
        let median = if samples % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        Some(Summary {
            samples,
            average,
            median,
        })
    }
}

/// Laning and kill summary for a set of records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub last_hits_at_5: Summary,
    pub kills: Summary,
}

impl PerformanceSummary {
    pub fn from_records(records: &[InferredPlayerRecord]) -> Option<Self> {
        let last_hits_at_5 =
            Summary::from_values(records.iter().map(|r| f64::from(r.last_hits_at_5)))?;
        let kills = Summary::from_values(records.iter().map(|r| f64::from(r.kills)))?;
        Some(PerformanceSummary {
            last_hits_at_5,
            kills,
        })
    }
}
