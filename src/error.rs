use thiserror::Error;

use crate::data::infer::DataType;

// ---------------------------------------------------------------------------
// DataError – everything that can go wrong while ingesting a sample stream
// ---------------------------------------------------------------------------

/// Failures of the ingestion chain (segment → infer → materialize).
///
/// None of these ever comes with a partial dataset: the caller either gets a
/// complete typed dataset or one of these.
#[derive(Debug, Error)]
pub enum DataError {
    /// A value token on a data line is not a number.
    #[error("unable to parse input (not a number) at line {line}: '{token}'")]
    Parse { line: usize, token: String },

    /// None of the inference rules matched.
    #[error("could not guess datatype from input, please specify one with -t")]
    AmbiguousSchema,

    /// Feature vectors of unequal length where equal length is required.
    #[error("dimension mismatch in {scope}: expected {expected} values, got {found}")]
    DimensionMismatch {
        scope: String,
        expected: usize,
        found: usize,
    },

    /// The resolved type has no dataset layout yet.
    #[error("{0} data is not implemented yet")]
    UnimplementedSchema(DataType),

    /// The forced type hint is not one of the recognised values.
    #[error("datatype must be one of: classification, regression, timeseries or unlabelled (got '{0}')")]
    InvalidDataType(String),

    /// `--num-samples` must be a positive number.
    #[error("number of training samples must be positive (got {0})")]
    InvalidSampleLimit(f64),

    /// The input contained no data lines at all.
    #[error("input contains no samples")]
    Empty,

    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// PipelineError – registry, assembly, persistence and training failures
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A module name is not present in its family's registry.
    #[error("no {family} module with the name: {name}")]
    ModuleNotFound {
        family: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("only one classifier is allowed per pipeline, got {0}")]
    MultipleClassifiers(usize),

    #[error("pipeline has no classifier")]
    NoClassifier,

    #[error("pipeline has not been trained")]
    NotTrained,

    #[error("{module} cannot be trained on this data: {reason}")]
    Incompatible { module: &'static str, reason: String },

    #[error("training data is empty")]
    EmptyTrainingData,

    #[error("invalid number of folds {folds} for {samples} samples")]
    InvalidFolds { folds: usize, samples: usize },

    #[error("unsupported pipeline file: {0}")]
    Format(String),

    #[error("pipeline serialization: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("pipeline file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_line_number() {
        let err = DataError::Parse {
            line: 7,
            token: "bar".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("bar"));
    }

    #[test]
    fn unimplemented_schema_is_distinct_from_ambiguous() {
        let unimpl = DataError::UnimplementedSchema(DataType::Regression);
        assert!(matches!(unimpl, DataError::UnimplementedSchema(DataType::Regression)));
        assert!(unimpl.to_string().contains("regression"));
        assert_ne!(unimpl.to_string(), DataError::AmbiguousSchema.to_string());
    }

    #[test]
    fn module_not_found_names_the_module() {
        let err = PipelineError::ModuleNotFound {
            family: "classifier",
            name: "Nope".into(),
            available: vec!["DTW".into()],
        };
        assert_eq!(err.to_string(), "no classifier module with the name: Nope");
    }
}
