use std::io::{self, Write};

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::model::{ClassificationData, TimeSeriesClassificationData, TypedDataset};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// TrainingLimit – what `train --num-samples` keeps for training
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingLimit {
    All,
    /// The first `n` entries in file order.
    First(usize),
    /// This fraction of every class, drawn at random; the rest is held out.
    Fraction(f64),
}

impl TrainingLimit {
    /// `n > 1` caps the entry count, `0 < n < 1` is a stratified fraction and
    /// `n == 1` keeps everything.
    pub fn from_num_samples(n: f64) -> Result<Self, DataError> {
        if !n.is_finite() || n <= 0.0 {
            return Err(DataError::InvalidSampleLimit(n));
        }
        Ok(if n < 1.0 {
            TrainingLimit::Fraction(n)
        } else if n == 1.0 {
            TrainingLimit::All
        } else {
            TrainingLimit::First(n as usize)
        })
    }
}

impl TypedDataset {
    /// Keep only the first `n` entries.
    pub fn truncate(&mut self, n: usize) {
        match self {
            TypedDataset::Classification(d) => d.samples.truncate(n),
            TypedDataset::TimeSeries(d) => d.samples.truncate(n),
        }
    }

    /// Keep `floor(count * fraction)` randomly chosen entries of every class
    /// and return the remainder. Both sides stay in file order and share the
    /// class names.
    pub fn holdout(&mut self, fraction: f64, rng: &mut StdRng) -> TypedDataset {
        let kept = self.len();
        let held = match self {
            TypedDataset::Classification(d) => {
                let (train, test) = stratified_split(std::mem::take(&mut d.samples), fraction, rng);
                d.samples = train;
                TypedDataset::Classification(ClassificationData {
                    dim: d.dim,
                    class_names: d.class_names.clone(),
                    samples: test,
                })
            }
            TypedDataset::TimeSeries(d) => {
                let (train, test) = stratified_split(std::mem::take(&mut d.samples), fraction, rng);
                d.samples = train;
                TypedDataset::TimeSeries(TimeSeriesClassificationData {
                    dim: d.dim,
                    class_names: d.class_names.clone(),
                    samples: test,
                })
            }
        };
        info!(
            "kept {} of {kept} entries for training, {} held out",
            self.len(),
            held.len()
        );
        held
    }
}

fn stratified_split<T>(
    samples: Vec<(usize, T)>,
    fraction: f64,
    rng: &mut StdRng,
) -> (Vec<(usize, T)>, Vec<(usize, T)>) {
    let classes = samples.iter().map(|(l, _)| l + 1).max().unwrap_or(0);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); classes];
    for (i, (label, _)) in samples.iter().enumerate() {
        by_class[*label].push(i);
    }

    let mut keep = vec![false; samples.len()];
    for mut indices in by_class {
        let n = (indices.len() as f64 * fraction).floor() as usize;
        indices.shuffle(rng);
        for i in indices.into_iter().take(n) {
            keep[i] = true;
        }
    }

    let (train, test): (Vec<_>, Vec<_>) = samples
        .into_iter()
        .zip(keep)
        .partition(|(_, k)| *k);
    (
        train.into_iter().map(|(s, _)| s).collect(),
        test.into_iter().map(|(s, _)| s).collect(),
    )
}

/// Write `dataset` back in the input text format: a type comment, one
/// tab-separated line per row, series separated by blank lines.
pub fn write_dataset(dataset: &TypedDataset, out: &mut impl Write) -> io::Result<()> {
    let names = dataset.class_names();
    let name = |label: usize| names.get(label).map(String::as_str).unwrap_or("NULL");

    match dataset {
        TypedDataset::Classification(d) => {
            writeln!(out, "# classification")?;
            for (label, row) in &d.samples {
                write_row(out, name(*label), row)?;
            }
        }
        TypedDataset::TimeSeries(d) => {
            writeln!(out, "# timeseries")?;
            for (label, matrix) in &d.samples {
                writeln!(out)?;
                for row in matrix.iter_rows() {
                    write_row(out, name(*label), row)?;
                }
            }
        }
    }
    Ok(())
}

fn write_row(out: &mut impl Write, label: &str, row: &[f64]) -> io::Result<()> {
    write!(out, "{label}")?;
    for v in row {
        write!(out, "\t{v}")?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::data::infer::DataType;
    use crate::data::loader::load_data;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn num_samples_interpretation() {
        assert_eq!(TrainingLimit::from_num_samples(1.0).unwrap(), TrainingLimit::All);
        assert_eq!(TrainingLimit::from_num_samples(25.0).unwrap(), TrainingLimit::First(25));
        assert_eq!(TrainingLimit::from_num_samples(0.5).unwrap(), TrainingLimit::Fraction(0.5));
        assert!(TrainingLimit::from_num_samples(0.0).is_err());
        assert!(TrainingLimit::from_num_samples(-3.0).is_err());
        assert!(TrainingLimit::from_num_samples(f64::NAN).is_err());
    }

    #[test]
    fn truncate_keeps_the_first_entries() {
        let mut ds = load_data("a 1\nb 2\na 3\nb 4\n".as_bytes(), None).unwrap().dataset;
        ds.truncate(3);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.sequences()[2], (0, vec![vec![3.0]]));
    }

    #[test]
    fn holdout_is_stratified() {
        let text = "a 1\na 2\na 3\na 4\nb 5\nb 6\nc 7\nc 8\nc 9\nc 10\nc 11\nc 12\n";
        let mut ds = load_data(text.as_bytes(), None).unwrap().dataset;
        let held = ds.holdout(0.5, &mut rng());

        assert_eq!(ds.class_counts(), vec![2, 1, 3]);
        assert_eq!(held.class_counts(), vec![2, 1, 3]);
        assert_eq!(held.class_names(), ds.class_names());

        // file order survives on both sides
        let values = |d: &TypedDataset| -> Vec<f64> {
            d.sequences().into_iter().map(|(_, rows)| rows[0][0]).collect()
        };
        for side in [values(&ds), values(&held)] {
            assert!(side.windows(2).all(|w| w[0] < w[1]), "{side:?}");
        }
    }

    #[test]
    fn held_out_series_reload_as_the_same_series() {
        let text = "up 1 1\nup 2 2\nup 3 3\n\ndown 3 3\ndown 2 2\n\nup 1 0\nup 2 0\nup 3 0\n\ndown 0 3\ndown 0 2\n";
        let mut ds = load_data(text.as_bytes(), None).unwrap().dataset;
        let held = ds.holdout(0.5, &mut rng());
        assert_eq!(held.len(), 2);

        let mut out = Vec::new();
        write_dataset(&held, &mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("# timeseries\n\n"));

        let reloaded = load_data(written.as_bytes(), Some(DataType::Timeseries)).unwrap();
        let names = |d: &TypedDataset| -> Vec<(String, Vec<Vec<f64>>)> {
            d.sequences()
                .into_iter()
                .map(|(l, rows)| (d.class_names()[l].clone(), rows))
                .collect()
        };
        assert_eq!(names(&reloaded.dataset), names(&held));
    }

    #[test]
    fn classification_rows_are_tab_separated() {
        let ds = load_data("x 1.5 2\ny 3 -4\n".as_bytes(), None).unwrap().dataset;
        let mut out = Vec::new();
        write_dataset(&ds, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# classification\nx\t1.5\t2\ny\t3\t-4\n"
        );
    }
}
