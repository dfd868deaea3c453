use std::fmt;

// ---------------------------------------------------------------------------
// Sample / Block / Stream – the untyped result of segmentation
// ---------------------------------------------------------------------------

/// One parsed data line: a label token plus its numeric values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: String,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Number of values on the line.
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// A contiguous run of data lines between blank-line separators.
/// Never empty once emitted by the segmenter.
pub type Block = Vec<Sample>;

/// All blocks of one input, in file order.
pub type Stream = Vec<Block>;

// ---------------------------------------------------------------------------
// Matrix – row-major [rows, cols] storage for one time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build from rows that are already known to share one length.
    pub(crate) fn from_rows(rows: &[&[f64]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn to_vecs(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }
}

// ---------------------------------------------------------------------------
// Typed datasets
// ---------------------------------------------------------------------------

/// Flat rows, one per sample.
#[derive(Debug, Clone, Default)]
pub struct ClassificationData {
    /// Feature dimension shared by every row.
    pub dim: usize,
    pub class_names: Vec<String>,
    pub samples: Vec<(usize, Vec<f64>)>,
}

/// One labelled matrix per block.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesClassificationData {
    /// Feature dimension of the first series; each series is internally uniform.
    pub dim: usize,
    pub class_names: Vec<String>,
    pub samples: Vec<(usize, Matrix)>,
}

/// The concrete dataset shape chosen by type inference.
#[derive(Debug, Clone)]
pub enum TypedDataset {
    Classification(ClassificationData),
    TimeSeries(TimeSeriesClassificationData),
}

impl TypedDataset {
    pub fn class_names(&self) -> &[String] {
        match self {
            TypedDataset::Classification(d) => &d.class_names,
            TypedDataset::TimeSeries(d) => &d.class_names,
        }
    }

    /// Number of dataset entries (rows or series).
    pub fn len(&self) -> usize {
        match self {
            TypedDataset::Classification(d) => d.samples.len(),
            TypedDataset::TimeSeries(d) => d.samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry as `(class index, sequence of rows)`. A classification row
    /// becomes a sequence of length one.
    pub fn sequences(&self) -> Vec<(usize, Vec<Vec<f64>>)> {
        match self {
            TypedDataset::Classification(d) => d
                .samples
                .iter()
                .map(|(label, row)| (*label, vec![row.clone()]))
                .collect(),
            TypedDataset::TimeSeries(d) => d
                .samples
                .iter()
                .map(|(label, m)| (*label, m.to_vecs()))
                .collect(),
        }
    }

    /// Entries per class index, in class order.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.class_names().len()];
        let labels: Vec<usize> = match self {
            TypedDataset::Classification(d) => d.samples.iter().map(|(l, _)| *l).collect(),
            TypedDataset::TimeSeries(d) => d.samples.iter().map(|(l, _)| *l).collect(),
        };
        for l in labels {
            if let Some(c) = counts.get_mut(l) {
                *c += 1;
            }
        }
        counts
    }
}

impl fmt::Display for TypedDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, dim) = match self {
            TypedDataset::Classification(d) => ("classification", d.dim),
            TypedDataset::TimeSeries(d) => ("timeseries", d.dim),
        };
        writeln!(f, "DatasetType: {kind}")?;
        writeln!(f, "NumDimensions: {dim}")?;
        writeln!(f, "NumSamples: {}", self.len())?;
        writeln!(f, "NumClasses: {}", self.class_names().len())?;
        for (index, (name, count)) in self
            .class_names()
            .iter()
            .zip(self.class_counts())
            .enumerate()
        {
            writeln!(f, "  ClassLabel: {index} ({name}) NumSamples: {count}")?;
        }
        if let TypedDataset::TimeSeries(d) = self {
            let lengths = d.samples.iter().map(|(_, m)| m.rows());
            let min = lengths.clone().min().unwrap_or(0);
            let max = lengths.max().unwrap_or(0);
            writeln!(f, "SeriesLength: min {min} max {max}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_row_major() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        let m = Matrix::from_rows(&[&a[..], &b[..]]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(0).len(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.to_vecs(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn classification_rows_become_single_step_sequences() {
        let ds = TypedDataset::Classification(ClassificationData {
            dim: 1,
            class_names: vec!["x".into(), "y".into()],
            samples: vec![(0, vec![1.0]), (1, vec![2.0]), (0, vec![3.0])],
        });
        let seqs = ds.sequences();
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[1], (1, vec![vec![2.0]]));
        assert_eq!(ds.class_counts(), vec![2, 1]);
    }

    #[test]
    fn stats_list_every_class() {
        let ds = TypedDataset::TimeSeries(TimeSeriesClassificationData {
            dim: 1,
            class_names: vec!["wave".into()],
            samples: vec![(0, Matrix::from_rows(&[&[1.0][..], &[2.0][..]]))],
        });
        let text = ds.to_string();
        assert!(text.contains("DatasetType: timeseries"));
        assert!(text.contains("ClassLabel: 0 (wave) NumSamples: 1"));
        assert!(text.contains("SeriesLength: min 2 max 2"));
    }
}
