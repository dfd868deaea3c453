//! Pipeline layer: stage traits, the named-module registry, assembly and
//! persistence.
//!
//! ```text
//!   "MovingAverageFilter,Derivative"  "DTW"  ...
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ assemble  │  split lists, resolve names through `registry`
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐   preprocessing* → feature extraction* → classifier? → postprocessing*
//!   │ Pipeline  │
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ persist   │  JSON file, stages stored by module name + state
//!   └──────────┘
//! ```

use log::{debug, info};
use serde_json::Value;

use crate::data::model::TypedDataset;
use crate::error::PipelineError;

/// Implements [`Module`] for a serde-serializable stage type under the
/// given registry name.
macro_rules! impl_module {
    ($ty:ty, $name:literal) => {
        impl $crate::pipeline::Module for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn save_state(&self) -> serde_json::Result<serde_json::Value> {
                serde_json::to_value(self)
            }

            fn load_state(&mut self, state: serde_json::Value) -> serde_json::Result<()> {
                *self = serde_json::from_value(state)?;
                Ok(())
            }
        }
    };
}

pub mod assemble;
pub mod modules;
pub mod persist;
pub mod registry;
pub mod validation;

// ---------------------------------------------------------------------------
// Stage traits
// ---------------------------------------------------------------------------

/// Common capability of every stage: a registry name and a JSON state.
pub trait Module {
    fn name(&self) -> &'static str;
    fn save_state(&self) -> serde_json::Result<Value>;
    fn load_state(&mut self, state: Value) -> serde_json::Result<()>;
}

/// Filters a sequence of rows. Called once per dataset entry.
pub trait PreProcessing: Module {
    fn process(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>>;
}

/// Maps a sequence of rows to a (possibly shorter) sequence of feature rows.
pub trait FeatureExtraction: Module {
    fn extract(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>>;
}

/// Labelled sequences handed to a classifier, already run through the
/// preprocessing and feature stages.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub num_classes: usize,
    pub samples: Vec<(usize, Vec<Vec<f64>>)>,
}

impl TrainingSet {
    /// True when every entry is a single row.
    pub fn is_flat(&self) -> bool {
        self.samples.iter().all(|(_, rows)| rows.len() == 1)
    }
}

pub trait Classifier: Module {
    /// Whether the classifier accepts sequences longer than one row.
    fn timeseries_compatible(&self) -> bool;
    fn train(&mut self, data: &TrainingSet) -> Result<(), PipelineError>;
    fn predict(&self, rows: &[Vec<f64>]) -> Result<usize, PipelineError>;
}

/// Filters the stream of predicted class indices. `None` is a rejection.
pub trait PostProcessing: Module {
    fn reset(&mut self);
    fn process(&mut self, label: Option<usize>) -> Option<usize>;
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// An ordered chain of stages with at most one classifier.
#[derive(Default)]
pub struct Pipeline {
    preprocessing: Vec<Box<dyn PreProcessing>>,
    feature_extraction: Vec<Box<dyn FeatureExtraction>>,
    classifier: Option<Box<dyn Classifier>>,
    postprocessing: Vec<Box<dyn PostProcessing>>,
    class_names: Vec<String>,
    trained: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_preprocessing(&mut self, module: Box<dyn PreProcessing>) {
        self.preprocessing.push(module);
    }

    pub fn add_feature_extraction(&mut self, module: Box<dyn FeatureExtraction>) {
        self.feature_extraction.push(module);
    }

    /// Replaces any previous classifier and drops the trained state.
    pub fn set_classifier(&mut self, module: Box<dyn Classifier>) {
        self.classifier = Some(module);
        self.trained = false;
    }

    pub fn add_postprocessing(&mut self, module: Box<dyn PostProcessing>) {
        self.postprocessing.push(module);
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn class_name(&self, index: usize) -> Option<&str> {
        self.class_names.get(index).map(String::as_str)
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Stage names in execution order, grouped by family.
    pub fn stage_names(&self) -> StageNames {
        StageNames {
            preprocessing: self.preprocessing.iter().map(|m| m.name()).collect(),
            feature_extraction: self.feature_extraction.iter().map(|m| m.name()).collect(),
            classifier: self.classifier.as_ref().map(|m| m.name()),
            postprocessing: self.postprocessing.iter().map(|m| m.name()).collect(),
        }
    }

    /// Run preprocessing then feature extraction over one entry.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut rows = rows.to_vec();
        for module in &self.preprocessing {
            rows = module.process(&rows);
        }
        for module in &self.feature_extraction {
            rows = module.extract(&rows);
        }
        rows
    }

    pub(crate) fn training_set(&self, dataset: &TypedDataset) -> TrainingSet {
        TrainingSet {
            num_classes: dataset.class_names().len(),
            samples: dataset
                .sequences()
                .into_iter()
                .map(|(label, rows)| (label, self.transform(&rows)))
                .collect(),
        }
    }

    /// Train the classifier on the whole dataset and remember its class names.
    pub fn train(&mut self, dataset: &TypedDataset) -> Result<(), PipelineError> {
        if dataset.is_empty() {
            return Err(PipelineError::EmptyTrainingData);
        }
        let set = self.training_set(dataset);
        let classifier = self.classifier.as_mut().ok_or(PipelineError::NoClassifier)?;
        if !classifier.timeseries_compatible() && !set.is_flat() {
            return Err(PipelineError::Incompatible {
                module: classifier.name(),
                reason: "it classifies single rows; add a feature stage such as \
                         TimeDomainStatistics for time series input"
                    .into(),
            });
        }

        info!(
            "training {} on {} entries, {} classes",
            classifier.name(),
            set.samples.len(),
            set.num_classes
        );
        classifier.train(&set)?;

        self.class_names = dataset.class_names().to_vec();
        self.trained = true;
        self.reset();
        Ok(())
    }

    /// Classify one entry and pass the result through post-processing.
    pub fn predict(&mut self, rows: &[Vec<f64>]) -> Result<Option<usize>, PipelineError> {
        if !self.trained {
            return Err(PipelineError::NotTrained);
        }
        let features = self.transform(rows);
        let classifier = self.classifier.as_ref().ok_or(PipelineError::NoClassifier)?;
        let mut label = Some(classifier.predict(&features)?);
        for module in &mut self.postprocessing {
            label = module.process(label);
        }
        debug!("predicted {label:?}");
        Ok(label)
    }

    /// Clear post-processing history.
    pub fn reset(&mut self) {
        for module in &mut self.postprocessing {
            module.reset();
        }
    }
}

/// Names of a pipeline's stages, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNames {
    pub preprocessing: Vec<&'static str>,
    pub feature_extraction: Vec<&'static str>,
    pub classifier: Option<&'static str>,
    pub postprocessing: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::modules::classifiers::MinDist;
    use super::modules::features::TimeDomainStatistics;
    use super::modules::postprocessing::ClassLabelChangeFilter;
    use super::modules::preprocessing::Derivative;
    use super::*;
    use crate::data::loader::load_data;

    fn dataset(text: &str) -> TypedDataset {
        load_data(text.as_bytes(), None).unwrap().dataset
    }

    #[test]
    fn transform_applies_stages_in_order() {
        let mut p = Pipeline::new();
        p.add_preprocessing(Box::new(Derivative::default()));
        p.add_feature_extraction(Box::new(TimeDomainStatistics::default()));
        // derivative of [1, 3, 5] is [0, 2, 2]; mean 4/3
        let out = p.transform(&[vec![1.0], vec![3.0], vec![5.0]]);
        assert_eq!(out.len(), 1);
        assert!((out[0][0] - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn train_requires_a_classifier() {
        let mut p = Pipeline::new();
        let ds = dataset("x 1\ny 2\n");
        assert!(matches!(p.train(&ds), Err(PipelineError::NoClassifier)));
    }

    #[test]
    fn predict_requires_training() {
        let mut p = Pipeline::new();
        p.set_classifier(Box::new(MinDist::default()));
        assert!(matches!(
            p.predict(&[vec![1.0]]),
            Err(PipelineError::NotTrained)
        ));
    }

    #[test]
    fn train_then_predict_with_postprocessing() {
        let mut p = Pipeline::new();
        p.set_classifier(Box::new(MinDist::default()));
        p.add_postprocessing(Box::new(ClassLabelChangeFilter::default()));
        p.train(&dataset("low 0\nhigh 10\nlow 1\nhigh 11\n")).unwrap();

        assert_eq!(p.class_names(), &["low", "high"]);
        assert_eq!(p.predict(&[vec![0.5]]).unwrap(), Some(0));
        // same label again is suppressed by the change filter
        assert_eq!(p.predict(&[vec![0.2]]).unwrap(), None);
        assert_eq!(p.predict(&[vec![9.0]]).unwrap(), Some(1));
    }

    #[test]
    fn flat_classifier_on_raw_time_series_is_incompatible() {
        let mut p = Pipeline::new();
        p.set_classifier(Box::new(MinDist::default()));
        let ds = dataset("up 1\nup 2\nup 3\n\ndown 3\ndown 2\n");
        assert!(matches!(
            p.train(&ds),
            Err(PipelineError::Incompatible { module: "MinDist", .. })
        ));
        assert!(!p.is_trained());

        p.add_feature_extraction(Box::new(TimeDomainStatistics::default()));
        p.train(&ds).unwrap();
        assert!(p.is_trained());
    }

    #[test]
    fn stage_names_follow_stage_order() {
        let mut p = Pipeline::new();
        p.add_postprocessing(Box::new(ClassLabelChangeFilter::default()));
        p.set_classifier(Box::new(MinDist::default()));
        p.add_preprocessing(Box::new(Derivative::default()));
        let names = p.stage_names();
        assert_eq!(names.preprocessing, vec!["Derivative"]);
        assert!(names.feature_extraction.is_empty());
        assert_eq!(names.classifier, Some("MinDist"));
        assert_eq!(names.postprocessing, vec!["ClassLabelChangeFilter"]);
    }
}
