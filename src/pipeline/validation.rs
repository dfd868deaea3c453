use log::{debug, info};

use super::registry::CLASSIFIERS;
use super::{Pipeline, TrainingSet};
use crate::data::model::TypedDataset;
use crate::error::PipelineError;

/// Accuracy of each held-out fold.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub fold_accuracy: Vec<f64>,
}

impl CrossValidation {
    pub fn mean_accuracy(&self) -> f64 {
        if self.fold_accuracy.is_empty() {
            return 0.0;
        }
        self.fold_accuracy.iter().sum::<f64>() / self.fold_accuracy.len() as f64
    }
}

/// Deterministic fold index for every entry.
///
/// Plain assignment deals entries round-robin in file order. Stratified
/// assignment deals round-robin over the entries grouped by class (file order
/// within a class), so each class is spread over consecutive folds and every
/// fold gets its share.
pub fn assign_folds(labels: &[usize], folds: usize, stratified: bool) -> Vec<usize> {
    if !stratified {
        return (0..labels.len()).map(|i| i % folds).collect();
    }
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| labels[i]);

    let mut assignment = vec![0; labels.len()];
    for (rank, &i) in order.iter().enumerate() {
        assignment[i] = rank % folds;
    }
    assignment
}

impl Pipeline {
    /// K-fold evaluation followed by training on the full dataset.
    /// `folds <= 1` skips the evaluation.
    pub fn train_with_folds(
        &mut self,
        dataset: &TypedDataset,
        folds: usize,
        stratified: bool,
    ) -> Result<Option<CrossValidation>, PipelineError> {
        if folds <= 1 {
            self.train(dataset)?;
            return Ok(None);
        }
        let cv = self.cross_validate(dataset, folds, stratified)?;
        self.train(dataset)?;
        Ok(Some(cv))
    }

    pub fn cross_validate(
        &self,
        dataset: &TypedDataset,
        folds: usize,
        stratified: bool,
    ) -> Result<CrossValidation, PipelineError> {
        let name = self
            .classifier
            .as_ref()
            .map(|c| c.name())
            .ok_or(PipelineError::NoClassifier)?;
        let set = self.training_set(dataset);
        let n = set.samples.len();
        if folds < 2 || folds > n {
            return Err(PipelineError::InvalidFolds { folds, samples: n });
        }

        let labels: Vec<usize> = set.samples.iter().map(|(l, _)| *l).collect();
        let assignment = assign_folds(&labels, folds, stratified);
        let mut fold_accuracy = Vec::with_capacity(folds);

        for fold in 0..folds {
            let (test, train): (Vec<_>, Vec<_>) = set
                .samples
                .iter()
                .zip(&assignment)
                .partition(|(_, f)| **f == fold);
            if test.is_empty() {
                continue;
            }

            let mut classifier = CLASSIFIERS.resolve(name)?;
            classifier.train(&TrainingSet {
                num_classes: set.num_classes,
                samples: train.into_iter().map(|(s, _)| s.clone()).collect(),
            })?;

            let mut correct = 0usize;
            for ((label, rows), _) in &test {
                if classifier.predict(rows)? == *label {
                    correct += 1;
                }
            }
            let accuracy = correct as f64 / test.len() as f64;
            info!("fold {}/{folds}: accuracy {:.2}%", fold + 1, accuracy * 100.0);
            fold_accuracy.push(accuracy);
        }

        let cv = CrossValidation { fold_accuracy };
        debug!("{folds}-fold cross-validation accuracy: {:.2}%", cv.mean_accuracy() * 100.0);
        Ok(cv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_data;
    use crate::pipeline::assemble::{PipelineSpec, assemble};

    #[test]
    fn plain_folds_are_round_robin() {
        assert_eq!(assign_folds(&[0, 0, 1, 1, 1], 2, false), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn stratified_folds_spread_each_class() {
        let labels = [0, 0, 0, 0, 1, 1];
        let folds = assign_folds(&labels, 2, true);
        assert_eq!(folds, vec![0, 1, 0, 1, 0, 1]);
        for f in 0..2 {
            let ones = labels
                .iter()
                .zip(&folds)
                .filter(|(l, ff)| **l == 1 && **ff == f)
                .count();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn stratified_folds_do_not_pile_first_entries_into_one_fold() {
        assert_eq!(assign_folds(&[0, 1], 2, true), vec![0, 1]);
        // a, b, c, a
        assert_eq!(assign_folds(&[0, 1, 2, 0], 2, true), vec![0, 0, 1, 1]);
    }

    #[test]
    fn stratified_training_with_one_entry_per_class() {
        let ds = load_data("a 0\nb 1\n".as_bytes(), None).unwrap().dataset;
        let mut p = min_dist();
        let cv = p.train_with_folds(&ds, 2, true).unwrap().unwrap();
        assert_eq!(cv.fold_accuracy.len(), 2);
        assert!(p.is_trained());
    }

    fn separable() -> TypedDataset {
        load_data("a 0\nb 10\na 1\nb 11\na 0.5\nb 10.5\n".as_bytes(), None)
            .unwrap()
            .dataset
    }

    fn min_dist() -> Pipeline {
        assemble(&PipelineSpec {
            classifier: Some("MinDist".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn separable_data_scores_perfectly() {
        let mut p = min_dist();
        let cv = p.train_with_folds(&separable(), 3, true).unwrap().unwrap();
        assert_eq!(cv.fold_accuracy.len(), 3);
        assert_eq!(cv.mean_accuracy(), 1.0);
        assert!(p.is_trained());
    }

    #[test]
    fn single_fold_means_plain_training() {
        let mut p = min_dist();
        assert!(p.train_with_folds(&separable(), 1, false).unwrap().is_none());
        assert!(p.is_trained());
    }

    #[test]
    fn too_many_folds_is_an_error() {
        let p = min_dist();
        assert!(matches!(
            p.cross_validate(&separable(), 7, false),
            Err(PipelineError::InvalidFolds { folds: 7, samples: 6 })
        ));
    }
}
