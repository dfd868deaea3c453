use super::modules::classifiers::{Dtw, Knn, MinDist};
use super::modules::features::{Magnitude, TimeDomainStatistics};
use super::modules::postprocessing::{ClassLabelChangeFilter, ClassLabelFilter};
use super::modules::preprocessing::{DeadZone, Derivative, MovingAverageFilter};
use super::{Classifier, FeatureExtraction, PostProcessing, PreProcessing};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Registry – a fixed name → constructor table for one module family
// ---------------------------------------------------------------------------

pub struct Registry<T: ?Sized + 'static> {
    family: &'static str,
    entries: &'static [(&'static str, fn() -> Box<T>)],
}

impl<T: ?Sized + 'static> Registry<T> {
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// A fresh default instance, or `None` for an unknown name.
    pub fn create(&self, name: &str) -> Option<Box<T>> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, make)| make())
    }

    /// Registered names, in table order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(n, _)| *n).collect()
    }

    /// Like [`Registry::create`], but a miss carries the full name list.
    pub fn resolve(&self, name: &str) -> Result<Box<T>, PipelineError> {
        self.create(name).ok_or_else(|| PipelineError::ModuleNotFound {
            family: self.family,
            name: name.to_string(),
            available: self.names().into_iter().map(String::from).collect(),
        })
    }
}

fn preprocessing<M: PreProcessing + Default + 'static>() -> Box<dyn PreProcessing> {
    Box::new(M::default())
}

fn feature<M: FeatureExtraction + Default + 'static>() -> Box<dyn FeatureExtraction> {
    Box::new(M::default())
}

fn classifier<M: Classifier + Default + 'static>() -> Box<dyn Classifier> {
    Box::new(M::default())
}

fn postprocessing<M: PostProcessing + Default + 'static>() -> Box<dyn PostProcessing> {
    Box::new(M::default())
}

pub static PREPROCESSING: Registry<dyn PreProcessing> = Registry {
    family: "preprocessing",
    entries: &[
        ("DeadZone", preprocessing::<DeadZone>),
        ("Derivative", preprocessing::<Derivative>),
        ("MovingAverageFilter", preprocessing::<MovingAverageFilter>),
    ],
};

pub static FEATURE_EXTRACTION: Registry<dyn FeatureExtraction> = Registry {
    family: "feature extraction",
    entries: &[
        ("Magnitude", feature::<Magnitude>),
        ("TimeDomainStatistics", feature::<TimeDomainStatistics>),
    ],
};

pub static CLASSIFIERS: Registry<dyn Classifier> = Registry {
    family: "classifier",
    entries: &[
        ("DTW", classifier::<Dtw>),
        ("KNN", classifier::<Knn>),
        ("MinDist", classifier::<MinDist>),
    ],
};

pub static POSTPROCESSING: Registry<dyn PostProcessing> = Registry {
    family: "postprocessing",
    entries: &[
        ("ClassLabelChangeFilter", postprocessing::<ClassLabelChangeFilter>),
        ("ClassLabelFilter", postprocessing::<ClassLabelFilter>),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Module;

    #[test]
    fn every_registered_name_creates_a_module_of_that_name() {
        for name in PREPROCESSING.names() {
            assert_eq!(PREPROCESSING.create(name).unwrap().name(), name);
        }
        for name in FEATURE_EXTRACTION.names() {
            assert_eq!(FEATURE_EXTRACTION.create(name).unwrap().name(), name);
        }
        for name in CLASSIFIERS.names() {
            assert_eq!(CLASSIFIERS.create(name).unwrap().name(), name);
        }
        for name in POSTPROCESSING.names() {
            assert_eq!(POSTPROCESSING.create(name).unwrap().name(), name);
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(CLASSIFIERS.create("SVM").is_none());
        assert!(CLASSIFIERS.create("").is_none());
        assert!(CLASSIFIERS.create("dtw").is_none());
    }

    #[test]
    fn resolve_miss_lists_available_names() {
        match CLASSIFIERS.resolve("SVM") {
            Err(PipelineError::ModuleNotFound {
                family,
                name,
                available,
            }) => {
                assert_eq!(family, "classifier");
                assert_eq!(name, "SVM");
                assert_eq!(available, vec!["DTW", "KNN", "MinDist"]);
            }
            _ => panic!("expected ModuleNotFound"),
        }
    }

    #[test]
    fn names_are_in_table_order() {
        assert_eq!(
            PREPROCESSING.names(),
            vec!["DeadZone", "Derivative", "MovingAverageFilter"]
        );
        assert_eq!(FEATURE_EXTRACTION.family(), "feature extraction");
    }
}
