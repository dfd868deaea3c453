use super::infer::DataType;
use super::labels::LabelRegistry;
use super::model::{
    ClassificationData, Matrix, Stream, TimeSeriesClassificationData, TypedDataset,
};
use crate::error::DataError;

/// Turn a segmented stream into the dataset shape `ty` requires, registering
/// labels in `registry` as they are encountered.
pub fn materialize(
    stream: &Stream,
    ty: DataType,
    registry: &mut LabelRegistry,
) -> Result<TypedDataset, DataError> {
    match ty {
        DataType::Classification => classification(stream, registry),
        DataType::Timeseries => timeseries(stream, registry),
        DataType::Regression | DataType::Unlabelled => Err(DataError::UnimplementedSchema(ty)),
    }
}

/// One row per sample; block boundaries are irrelevant.
fn classification(
    stream: &Stream,
    registry: &mut LabelRegistry,
) -> Result<TypedDataset, DataError> {
    let dim = first_dim(stream);
    let mut samples = Vec::new();

    for (b, block) in stream.iter().enumerate() {
        for (i, sample) in block.iter().enumerate() {
            if sample.dim() != dim {
                return Err(DataError::DimensionMismatch {
                    scope: format!("block {b}, sample {i}"),
                    expected: dim,
                    found: sample.dim(),
                });
            }
            samples.push((registry.index_of(&sample.label), sample.values.clone()));
        }
    }

    Ok(TypedDataset::Classification(ClassificationData {
        dim,
        class_names: registry.labels().to_vec(),
        samples,
    }))
}

/// One matrix per block, labelled by the block's last sample. Every row of
/// every block must have the dimension of the first sample in the stream.
fn timeseries(stream: &Stream, registry: &mut LabelRegistry) -> Result<TypedDataset, DataError> {
    let dim = first_dim(stream);
    let mut samples = Vec::with_capacity(stream.len());

    for (b, block) in stream.iter().enumerate() {
        let Some(last) = block.last() else {
            continue;
        };
        if let Some((i, bad)) = block.iter().enumerate().find(|(_, s)| s.dim() != dim) {
            return Err(DataError::DimensionMismatch {
                scope: format!("block {b}, sample {i}"),
                expected: dim,
                found: bad.dim(),
            });
        }

        let rows: Vec<&[f64]> = block.iter().map(|s| s.values.as_slice()).collect();
        samples.push((registry.index_of(&last.label), Matrix::from_rows(&rows)));
    }

    Ok(TypedDataset::TimeSeries(TimeSeriesClassificationData {
        dim,
        class_names: registry.labels().to_vec(),
        samples,
    }))
}

fn first_dim(stream: &Stream) -> usize {
    stream
        .iter()
        .flatten()
        .next()
        .map_or(0, |s| s.dim())
}
