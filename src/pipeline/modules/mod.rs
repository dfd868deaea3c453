//! Built-in stages, one file per family.

pub mod classifiers;
pub mod features;
pub mod postprocessing;
pub mod preprocessing;

/// Euclidean distance between two rows of equal length.
pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
