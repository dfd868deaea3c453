use serde::{Deserialize, Serialize};

use crate::pipeline::PreProcessing;

// ---------------------------------------------------------------------------
// MovingAverageFilter
// ---------------------------------------------------------------------------

/// Per-dimension mean over the last `window` rows (fewer at the start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverageFilter {
    pub window: usize,
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self { window: 5 }
    }
}

impl_module!(MovingAverageFilter, "MovingAverageFilter");

impl PreProcessing for MovingAverageFilter {
    fn process(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let window = self.window.max(1);
        (0..rows.len())
            .map(|t| {
                let span = &rows[t.saturating_sub(window - 1)..=t];
                let dim = rows[t].len();
                (0..dim)
                    .map(|d| {
                        span.iter().map(|r| r.get(d).copied().unwrap_or(0.0)).sum::<f64>()
                            / span.len() as f64
                    })
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// DeadZone
// ---------------------------------------------------------------------------

/// Zeroes values inside `[lower, upper]` and shifts the rest towards zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadZone {
    pub lower: f64,
    pub upper: f64,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self {
            lower: -0.1,
            upper: 0.1,
        }
    }
}

impl_module!(DeadZone, "DeadZone");

impl PreProcessing for DeadZone {
    fn process(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|&v| {
                        if v > self.upper {
                            v - self.upper
                        } else if v < self.lower {
                            v - self.lower
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Derivative
// ---------------------------------------------------------------------------

/// First difference between consecutive rows; the first row becomes zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Derivative {}

impl_module!(Derivative, "Derivative");

impl PreProcessing for Derivative {
    fn process(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut out = Vec::with_capacity(rows.len());
        if let Some(first) = rows.first() {
            out.push(vec![0.0; first.len()]);
        }
        for pair in rows.windows(2) {
            out.push(pair[1].iter().zip(&pair[0]).map(|(b, a)| b - a).collect());
        }
        out
    }
}
