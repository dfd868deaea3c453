use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::infer::{DataType, SchemaSignals, resolve_type};
use super::labels::LabelRegistry;
use super::materialize::materialize;
use super::model::TypedDataset;
use super::segment::segment;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// The outcome of one ingestion run.
#[derive(Debug)]
pub struct LoadedData {
    pub data_type: DataType,
    pub signals: SchemaSignals,
    pub labels: LabelRegistry,
    pub dataset: TypedDataset,
}

/// Open `path` for reading; `-` is stdin.
pub fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(Path::new(path))
        .with_context(|| format!("could not open data file: {path}"))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Read the whole input, infer (or accept) its type and build the dataset.
///
/// Nothing is returned unless every stage succeeds.
pub fn load_data<R: BufRead>(input: R, hint: Option<DataType>) -> Result<LoadedData, DataError> {
    let stream = segment(input)?;
    if stream.is_empty() {
        return Err(DataError::Empty);
    }

    let signals = SchemaSignals::from_stream(&stream);
    let data_type = resolve_type(&stream, hint)?;

    let mut labels = LabelRegistry::new();
    let dataset = materialize(&stream, data_type, &mut labels)?;

    info!(
        "loaded {} blocks as {data_type} data ({} entries, {} classes)",
        stream.len(),
        dataset.len(),
        labels.len()
    );
    Ok(LoadedData {
        data_type,
        signals,
        labels,
        dataset,
    })
}

/// [`open_input`] followed by [`load_data`].
pub fn load_path(path: &str, hint: Option<DataType>) -> Result<LoadedData> {
    let input = open_input(path)?;
    let loaded = load_data(input, hint).with_context(|| format!("loading {path}"))?;
    info!("{}", loaded.dataset);
    Ok(loaded)
}
