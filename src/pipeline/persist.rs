use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use super::registry::{CLASSIFIERS, FEATURE_EXTRACTION, POSTPROCESSING, PREPROCESSING, Registry};
use super::{Module, Pipeline};
use crate::error::PipelineError;

const FORMAT: &str = "grtool-pipeline";
const VERSION: u32 = 1;

/// On-disk layout of a pipeline.
#[derive(Debug, Serialize, Deserialize)]
struct PipelineFile {
    format: String,
    version: u32,
    trained: bool,
    #[serde(default)]
    class_names: Vec<String>,
    #[serde(default)]
    preprocessing: Vec<StageRecord>,
    #[serde(default)]
    feature_extraction: Vec<StageRecord>,
    #[serde(default)]
    classifier: Option<StageRecord>,
    #[serde(default)]
    postprocessing: Vec<StageRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StageRecord {
    module: String,
    state: Value,
}

fn record<M: Module + ?Sized>(module: &M) -> Result<StageRecord, PipelineError> {
    Ok(StageRecord {
        module: module.name().to_string(),
        state: module.save_state()?,
    })
}

/// Recreate a stage by name and restore its state.
fn restore<T>(registry: &Registry<T>, rec: StageRecord) -> Result<Box<T>, PipelineError>
where
    T: Module + ?Sized + 'static,
{
    let mut module = registry.resolve(&rec.module)?;
    module.load_state(rec.state)?;
    Ok(module)
}

impl Pipeline {
    pub fn to_json(&self) -> Result<String, PipelineError> {
        let file = PipelineFile {
            format: FORMAT.to_string(),
            version: VERSION,
            trained: self.trained,
            class_names: self.class_names.clone(),
            preprocessing: self
                .preprocessing
                .iter()
                .map(|m| record(m.as_ref()))
                .collect::<Result<_, _>>()?,
            feature_extraction: self
                .feature_extraction
                .iter()
                .map(|m| record(m.as_ref()))
                .collect::<Result<_, _>>()?,
            classifier: self.classifier.as_ref().map(|m| record(m.as_ref())).transpose()?,
            postprocessing: self
                .postprocessing
                .iter()
                .map(|m| record(m.as_ref()))
                .collect::<Result<_, _>>()?,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let file: PipelineFile = serde_json::from_str(text)?;
        if file.format != FORMAT {
            return Err(PipelineError::Format(format!("unknown format '{}'", file.format)));
        }
        if file.version != VERSION {
            return Err(PipelineError::Format(format!("unsupported version {}", file.version)));
        }

        let mut pipeline = Pipeline::new();
        for rec in file.preprocessing {
            pipeline.add_preprocessing(restore(&PREPROCESSING, rec)?);
        }
        for rec in file.feature_extraction {
            pipeline.add_feature_extraction(restore(&FEATURE_EXTRACTION, rec)?);
        }
        if let Some(rec) = file.classifier {
            pipeline.set_classifier(restore(&CLASSIFIERS, rec)?);
        }
        for rec in file.postprocessing {
            pipeline.add_postprocessing(restore(&POSTPROCESSING, rec)?);
        }
        pipeline.class_names = file.class_names;
        pipeline.trained = file.trained && pipeline.classifier.is_some();
        Ok(pipeline)
    }

    /// Serialize completely in memory, write a sibling temporary file and
    /// rename it over `path`. A failed write leaves `path` as it was.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let text = self.to_json()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!("pipeline saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)?;
        let pipeline = Self::from_json(&text)?;
        debug!("pipeline loaded from {}", path.display());
        Ok(pipeline)
    }
}
