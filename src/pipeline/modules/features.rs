use serde::{Deserialize, Serialize};

use crate::pipeline::FeatureExtraction;

/// Replaces each row with its Euclidean norm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Magnitude {}

impl_module!(Magnitude, "Magnitude");

impl FeatureExtraction for Magnitude {
    fn extract(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| vec![row.iter().map(|v| v * v).sum::<f64>().sqrt()])
            .collect()
    }
}

/// Collapses a whole sequence into one row: per-dimension mean followed by
/// per-dimension (population) standard deviation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeDomainStatistics {}

impl_module!(TimeDomainStatistics, "TimeDomainStatistics");

impl FeatureExtraction for TimeDomainStatistics {
    fn extract(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let Some(first) = rows.first() else {
            return vec![Vec::new()];
        };
        let dim = first.len();
        let n = rows.len() as f64;

        let mean: Vec<f64> = (0..dim)
            .map(|d| rows.iter().map(|r| r.get(d).copied().unwrap_or(0.0)).sum::<f64>() / n)
            .collect();
        let spread: Vec<f64> = (0..dim)
            .map(|d| {
                let var = rows
                    .iter()
                    .map(|r| (r.get(d).copied().unwrap_or(0.0) - mean[d]).powi(2))
                    .sum::<f64>()
                    / n;
                var.sqrt()
            })
            .collect();

        vec![mean.into_iter().chain(spread).collect()]
    }
}
