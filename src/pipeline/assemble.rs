use std::path::Path;

use log::{debug, info};

use super::Pipeline;
use super::registry::{CLASSIFIERS, FEATURE_EXTRACTION, POSTPROCESSING, PREPROCESSING};
use crate::error::PipelineError;

/// The module lists given to `create`, each comma separated.
#[derive(Debug, Clone, Default)]
pub struct PipelineSpec {
    pub preprocessing: Option<String>,
    pub feature_extraction: Option<String>,
    pub classifier: Option<String>,
    pub postprocessing: Option<String>,
}

/// Split a comma-separated module list.
///
/// Segments are trimmed and empty ones are dropped, so `"Foo,"`, `",Foo"`
/// and `"Foo,,Bar"` never trigger a lookup of an empty name.
pub fn split_module_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Resolve every listed name and chain the stages in their fixed order.
/// The first unknown name aborts the whole assembly.
pub fn assemble(spec: &PipelineSpec) -> Result<Pipeline, PipelineError> {
    let mut pipeline = Pipeline::new();

    for name in names(&spec.preprocessing) {
        pipeline.add_preprocessing(PREPROCESSING.resolve(name)?);
    }
    for name in names(&spec.feature_extraction) {
        pipeline.add_feature_extraction(FEATURE_EXTRACTION.resolve(name)?);
    }
    match names(&spec.classifier).as_slice() {
        [] => {}
        [name] => pipeline.set_classifier(CLASSIFIERS.resolve(name)?),
        many => return Err(PipelineError::MultipleClassifiers(many.len())),
    }
    for name in names(&spec.postprocessing) {
        pipeline.add_postprocessing(POSTPROCESSING.resolve(name)?);
    }

    debug!("assembled {:?}", pipeline.stage_names());
    Ok(pipeline)
}

fn names(list: &Option<String>) -> Vec<&str> {
    list.as_deref().map(split_module_list).unwrap_or_default()
}

/// Assemble and write an untrained template to `path`. On any failure the
/// file is not touched.
pub fn create_template(spec: &PipelineSpec, path: &Path) -> Result<Pipeline, PipelineError> {
    let pipeline = assemble(spec)?;
    pipeline.save(path)?;
    info!("template pipeline written to {}", path.display());
    Ok(pipeline)
}
