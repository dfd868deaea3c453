use serde::{Deserialize, Serialize};

use super::euclidean;
use crate::error::PipelineError;
use crate::pipeline::{Classifier, TrainingSet};

/// Single-row classifiers need flat, equally sized feature vectors.
fn flat_rows(module: &'static str, data: &TrainingSet) -> Result<Vec<(usize, Vec<f64>)>, PipelineError> {
    if data.samples.is_empty() {
        return Err(PipelineError::EmptyTrainingData);
    }
    if !data.is_flat() {
        return Err(PipelineError::Incompatible {
            module,
            reason: "time series input needs a timeseries classifier or a feature stage that \
                     collapses each series into one row"
                .into(),
        });
    }
    let dim = data.samples[0].1[0].len();
    let mut rows = Vec::with_capacity(data.samples.len());
    for (label, seq) in &data.samples {
        if seq[0].len() != dim {
            return Err(PipelineError::Incompatible {
                module,
                reason: format!("expected {dim} features, got {}", seq[0].len()),
            });
        }
        rows.push((*label, seq[0].clone()));
    }
    Ok(rows)
}

fn single_row<'a>(module: &'static str, rows: &'a [Vec<f64>]) -> Result<&'a [f64], PipelineError> {
    match rows {
        [row] => Ok(row),
        _ => Err(PipelineError::Incompatible {
            module,
            reason: format!("expected one feature row, got {}", rows.len()),
        }),
    }
}

/// Every row must have exactly `dim` values.
fn check_dim(module: &'static str, dim: usize, rows: &[Vec<f64>]) -> Result<(), PipelineError> {
    match rows.iter().find(|r| r.len() != dim) {
        Some(row) => Err(PipelineError::Incompatible {
            module,
            reason: format!("expected {dim} features, got {}", row.len()),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// DTW – nearest template under dynamic time warping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dtw {
    #[serde(default)]
    dim: usize,
    templates: Vec<(usize, Vec<Vec<f64>>)>,
}

impl_module!(Dtw, "DTW");

/// Classic O(n·m) warping distance with Euclidean local cost.
pub(crate) fn dtw_distance(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return if a.len() == b.len() { 0.0 } else { f64::INFINITY };
    }
    let m = b.len();
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut cur = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for row in a {
        cur[0] = f64::INFINITY;
        for j in 1..=m {
            let cost = euclidean(row, &b[j - 1]);
            cur[j] = cost + prev[j].min(cur[j - 1]).min(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[m]
}

impl Classifier for Dtw {
    fn timeseries_compatible(&self) -> bool {
        true
    }

    fn train(&mut self, data: &TrainingSet) -> Result<(), PipelineError> {
        let Some(dim) = data.samples.iter().flat_map(|(_, t)| t.first()).map(Vec::len).next() else {
            return Err(PipelineError::EmptyTrainingData);
        };
        for (_, template) in &data.samples {
            check_dim("DTW", dim, template)?;
        }
        self.dim = dim;
        self.templates = data.samples.clone();
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<usize, PipelineError> {
        if self.templates.is_empty() {
            return Err(PipelineError::NotTrained);
        }
        check_dim("DTW", self.dim, rows)?;
        self.templates
            .iter()
            .map(|(label, t)| (*label, dtw_distance(rows, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, _)| label)
            .ok_or(PipelineError::NotTrained)
    }
}

// ---------------------------------------------------------------------------
// KNN – majority vote among the k nearest training rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knn {
    pub k: usize,
    num_classes: usize,
    samples: Vec<(usize, Vec<f64>)>,
}

impl Default for Knn {
    fn default() -> Self {
        Self {
            k: 3,
            num_classes: 0,
            samples: Vec::new(),
        }
    }
}

impl_module!(Knn, "KNN");

impl Classifier for Knn {
    fn timeseries_compatible(&self) -> bool {
        false
    }

    fn train(&mut self, data: &TrainingSet) -> Result<(), PipelineError> {
        self.samples = flat_rows("KNN", data)?;
        self.num_classes = data.num_classes;
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<usize, PipelineError> {
        let x = single_row("KNN", rows)?;
        let Some((_, first)) = self.samples.first() else {
            return Err(PipelineError::NotTrained);
        };
        check_dim("KNN", first.len(), rows)?;

        let mut by_distance: Vec<(f64, usize)> = self
            .samples
            .iter()
            .map(|(label, row)| (euclidean(x, row), *label))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        let neighbours = &by_distance[..self.k.clamp(1, by_distance.len())];

        let classes = self
            .num_classes
            .max(neighbours.iter().map(|(_, l)| l + 1).max().unwrap_or(0));
        let mut votes = vec![0usize; classes];
        for (_, label) in neighbours {
            votes[*label] += 1;
        }
        let best = votes.iter().copied().max().unwrap_or(0);

        // Ties go to the class of the closest neighbour among the leaders.
        neighbours
            .iter()
            .map(|(_, l)| *l)
            .find(|l| votes[*l] == best)
            .ok_or(PipelineError::NotTrained)
    }
}

// ---------------------------------------------------------------------------
// MinDist – nearest class centroid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinDist {
    centroids: Vec<(usize, Vec<f64>)>,
}

impl_module!(MinDist, "MinDist");

impl Classifier for MinDist {
    fn timeseries_compatible(&self) -> bool {
        false
    }

    fn train(&mut self, data: &TrainingSet) -> Result<(), PipelineError> {
        let rows = flat_rows("MinDist", data)?;
        let dim = rows[0].1.len();
        let classes = data
            .num_classes
            .max(rows.iter().map(|(l, _)| l + 1).max().unwrap_or(0));

        let mut sums = vec![(0usize, vec![0.0; dim]); classes];
        for (label, row) in &rows {
            let (count, sum) = &mut sums[*label];
            *count += 1;
            sum.iter_mut().zip(row).for_each(|(s, v)| *s += v);
        }

        self.centroids = sums
            .into_iter()
            .enumerate()
            .filter(|(_, (count, _))| *count > 0)
            .map(|(label, (count, sum))| {
                (label, sum.into_iter().map(|s| s / count as f64).collect())
            })
            .collect();
        Ok(())
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<usize, PipelineError> {
        let x = single_row("MinDist", rows)?;
        let Some((_, first)) = self.centroids.first() else {
            return Err(PipelineError::NotTrained);
        };
        check_dim("MinDist", first.len(), rows)?;
        self.centroids
            .iter()
            .map(|(label, c)| (*label, euclidean(x, c)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, _)| label)
            .ok_or(PipelineError::NotTrained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(samples: Vec<(usize, Vec<Vec<f64>>)>) -> TrainingSet {
        let num_classes = samples.iter().map(|(l, _)| l + 1).max().unwrap_or(0);
        TrainingSet {
            num_classes,
            samples,
        }
    }

    #[test]
    fn dtw_distance_ignores_time_stretch() {
        let a = vec![vec![0.0], vec![1.0], vec![2.0]];
        let b = vec![vec![0.0], vec![0.0], vec![1.0], vec![1.0], vec![2.0]];
        assert_eq!(dtw_distance(&a, &b), 0.0);
        assert!(dtw_distance(&a, &[vec![5.0]]) > 0.0);
    }

    #[test]
    fn dtw_picks_nearest_template() {
        let mut dtw = Dtw::default();
        dtw.train(&set(vec![
            (0, vec![vec![0.0], vec![1.0], vec![2.0]]),
            (1, vec![vec![2.0], vec![1.0], vec![0.0]]),
        ]))
        .unwrap();
        assert_eq!(dtw.predict(&[vec![0.0], vec![2.0]]).unwrap(), 0);
        assert_eq!(dtw.predict(&[vec![2.0], vec![2.0], vec![0.0]]).unwrap(), 1);
    }

    #[test]
    fn knn_votes_among_neighbours() {
        let mut knn = Knn::default();
        knn.train(&set(vec![
            (0, vec![vec![0.0]]),
            (0, vec![vec![0.2]]),
            (1, vec![vec![5.0]]),
            (1, vec![vec![5.1]]),
            (1, vec![vec![5.2]]),
        ]))
        .unwrap();
        assert_eq!(knn.predict(&[vec![0.1]]).unwrap(), 0);
        assert_eq!(knn.predict(&[vec![4.0]]).unwrap(), 1);
    }

    #[test]
    fn flat_classifiers_reject_raw_time_series() {
        let data = set(vec![(0, vec![vec![0.0], vec![1.0]])]);
        assert!(matches!(
            Knn::default().train(&data),
            Err(PipelineError::Incompatible { module: "KNN", .. })
        ));
        assert!(matches!(
            MinDist::default().train(&data),
            Err(PipelineError::Incompatible { module: "MinDist", .. })
        ));
    }

    #[test]
    fn min_dist_uses_class_centroids() {
        let mut md = MinDist::default();
        md.train(&set(vec![
            (0, vec![vec![0.0, 0.0]]),
            (0, vec![vec![2.0, 0.0]]),
            (1, vec![vec![10.0, 10.0]]),
        ]))
        .unwrap();
        assert_eq!(md.predict(&[vec![1.0, 0.5]]).unwrap(), 0);
        assert_eq!(md.predict(&[vec![8.0, 9.0]]).unwrap(), 1);
    }

    #[test]
    fn dtw_rejects_rows_of_another_dimension() {
        let mut dtw = Dtw::default();
        let three = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]];
        dtw.train(&set(vec![(0, three.clone()), (1, three)])).unwrap();
        assert!(matches!(
            dtw.predict(&[vec![1.0]]),
            Err(PipelineError::Incompatible { module: "DTW", .. })
        ));

        let ragged = set(vec![(0, vec![vec![1.0, 2.0]]), (1, vec![vec![9.0]])]);
        assert!(Dtw::default().train(&ragged).is_err());
    }

    #[test]
    fn flat_classifiers_reject_queries_of_another_dimension() {
        let data = set(vec![(0, vec![vec![0.0, 0.0]]), (1, vec![vec![10.0, 10.0]])]);
        let mut md = MinDist::default();
        md.train(&data).unwrap();
        assert!(matches!(
            md.predict(&[vec![0.0, 0.0, 1000.0]]),
            Err(PipelineError::Incompatible { module: "MinDist", .. })
        ));

        let mut knn = Knn::default();
        knn.train(&data).unwrap();
        assert!(matches!(
            knn.predict(&[vec![0.0]]),
            Err(PipelineError::Incompatible { module: "KNN", .. })
        ));
    }

    #[test]
    fn min_dist_rejects_uneven_features() {
        let data = set(vec![(0, vec![vec![0.0, 1.0]]), (1, vec![vec![1.0]])]);
        assert!(MinDist::default().train(&data).is_err());
    }
}
