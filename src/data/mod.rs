/// Data layer: turning sample text into typed datasets.
///
/// Architecture:
/// ```text
///   text lines
///        │
///        ▼
///   ┌──────────┐
///   │   line    │  comment / blank / data
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ segment   │  data lines → Sample, blank lines → block boundaries
///   └──────────┘
///        │  Stream (Vec<Block>)
///        ▼
///   ┌──────────┐
///   │  infer    │  SchemaSignals → regression / classification / timeseries
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ materialize  │  + LabelRegistry → TypedDataset
///   └─────────────┘
/// ```
///
/// `loader` chains the stages for the command handlers; `split` trims a
/// loaded dataset for training and writes entries back as text.

pub mod infer;
pub mod labels;
pub mod line;
pub mod loader;
pub mod materialize;
pub mod model;
pub mod segment;
pub mod split;
