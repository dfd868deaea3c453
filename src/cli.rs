use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::pipeline::assemble::PipelineSpec;

#[derive(Parser, Debug)]
#[command(name = "grtool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, train and run gesture recognition pipelines from text data")]
pub struct Cli {
    /// Verbosity, 0 (errors only) to 4 (trace)
    #[arg(short, long, global = true, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a pipeline template from module names
    Create(CreateArgs),

    /// Train a pipeline on a data file and save it back
    Train(TrainArgs),

    /// Classify every entry of a data file with a trained pipeline
    Predict(PredictArgs),

    /// Show the inferred type and statistics of a data file
    Info(DataArgs),
}

/// Where the pipeline file lives.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Pipeline file
    #[arg(short, long, env = "GRTOOL_MODEL")]
    pub model: PathBuf,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// Input data file, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub data: String,

    /// Force the dataset type instead of inferring it
    /// (classification, regression, timeseries, unlabelled)
    #[arg(short = 't', long)]
    pub datatype: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Comma-separated preprocessing modules, or `list`
    #[arg(short, long)]
    pub preprocessing: Option<String>,

    /// Comma-separated feature extraction modules, or `list`
    #[arg(short, long)]
    pub features: Option<String>,

    /// Classifier module, or `list`
    #[arg(short, long)]
    pub classifier: Option<String>,

    /// Comma-separated postprocessing modules, or `list`
    #[arg(short = 'q', long)]
    pub postprocessing: Option<String>,
}

impl From<&CreateArgs> for PipelineSpec {
    fn from(a: &CreateArgs) -> Self {
        PipelineSpec {
            preprocessing: a.preprocessing.clone(),
            feature_extraction: a.features.clone(),
            classifier: a.classifier.clone(),
            postprocessing: a.postprocessing.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub data: DataArgs,

    /// Number of cross-validation folds; 0 or 1 trains without evaluation
    #[arg(short, long, default_value_t = 0)]
    pub k_folds: usize,

    /// Keep class proportions in every fold
    #[arg(short, long)]
    pub stratified: bool,

    /// Train on the first N entries; a value below 1 keeps that fraction of
    /// every class and writes the held-out entries to stdout
    #[arg(short, long, default_value_t = 1.0)]
    pub num_samples: f64,

    /// Seed for the held-out split
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub data: DataArgs,
}
