use std::fmt;
use std::str::FromStr;

use log::debug;

use super::model::Stream;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// DataType – the dataset shape a stream is materialized into
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Classification,
    Regression,
    Timeseries,
    Unlabelled,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Classification => "classification",
            DataType::Regression => "regression",
            DataType::Timeseries => "timeseries",
            DataType::Unlabelled => "unlabelled",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classification" => Ok(DataType::Classification),
            "regression" => Ok(DataType::Regression),
            "timeseries" => Ok(DataType::Timeseries),
            "unlabelled" => Ok(DataType::Unlabelled),
            other => Err(DataError::InvalidDataType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaSignals – global facts about a stream
// ---------------------------------------------------------------------------

/// Facts gathered in one pass over the whole stream.
///
/// `all_sample_dims_equal` and `data_dim_is_one` are reported but take no
/// part in [`SchemaSignals::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaSignals {
    pub all_labels_numeric: bool,
    pub all_block_sizes_equal: bool,
    pub labels_equal_within_block: bool,
    pub all_sample_dims_equal: bool,
    pub data_dim_is_one: bool,
}

/// Running state of the fold: the signals plus what the next step compares
/// against.
struct Fold {
    signals: SchemaSignals,
    block_size: Option<usize>,
    sample_dim: Option<usize>,
}

impl SchemaSignals {
    /// Every flag starts true and can only be cleared.
    const VACUOUS: SchemaSignals = SchemaSignals {
        all_labels_numeric: true,
        all_block_sizes_equal: true,
        labels_equal_within_block: true,
        all_sample_dims_equal: true,
        data_dim_is_one: true,
    };

    pub fn from_stream(stream: &Stream) -> Self {
        let init = Fold {
            signals: Self::VACUOUS,
            block_size: None,
            sample_dim: None,
        };

        let folded = stream.iter().fold(init, |mut acc, block| {
            let s = &mut acc.signals;
            s.all_block_sizes_equal &= acc.block_size.map_or(true, |n| n == block.len());
            acc.block_size = Some(block.len());

            // Rolling comparison against the immediately preceding sample.
            s.labels_equal_within_block &= block.windows(2).all(|w| w[0].label == w[1].label);

            for sample in block {
                s.all_labels_numeric &= is_number(&sample.label);
                s.all_sample_dims_equal &= acc.sample_dim.map_or(true, |d| d == sample.dim());
                s.data_dim_is_one &= sample.dim() == 1;
                acc.sample_dim = Some(sample.dim());
            }
            acc
        });

        folded.signals
    }

    /// The priority-ordered decision table. The first matching rule wins.
    pub fn decide(&self) -> Result<DataType, DataError> {
        let rules: [(bool, DataType); 3] = [
            (self.all_labels_numeric, DataType::Regression),
            (self.all_block_sizes_equal, DataType::Classification),
            (self.labels_equal_within_block, DataType::Timeseries),
        ];

        rules
            .iter()
            .find(|(fires, _)| *fires)
            .map(|(_, ty)| *ty)
            .ok_or(DataError::AmbiguousSchema)
    }
}

fn is_number(label: &str) -> bool {
    label.parse::<f64>().is_ok()
}

/// Parse an optional `--datatype` value. Empty means "infer".
pub fn parse_hint(hint: Option<&str>) -> Result<Option<DataType>, DataError> {
    match hint.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Resolve the dataset type: a given hint is authoritative, otherwise the
/// stream's signals decide.
pub fn resolve_type(stream: &Stream, hint: Option<DataType>) -> Result<DataType, DataError> {
    if let Some(ty) = hint {
        debug!("datatype forced to {ty}");
        return Ok(ty);
    }
    let signals = SchemaSignals::from_stream(stream);
    debug!("schema signals: {signals:?}");
    signals.decide()
}
