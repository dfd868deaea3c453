use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::{CreateArgs, DataArgs, PredictArgs, TrainArgs};
use crate::data::infer::parse_hint;
use crate::data::loader::{LoadedData, load_path};
use crate::data::split::{TrainingLimit, write_dataset};
use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::pipeline::validation::CrossValidation;
use crate::pipeline::assemble::{PipelineSpec, create_template};
use crate::pipeline::registry::{CLASSIFIERS, FEATURE_EXTRACTION, POSTPROCESSING, PREPROCESSING};

const LIST: &str = "list";

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

pub fn create(args: &CreateArgs) -> Result<()> {
    let mut out = io::stdout().lock();
    if list_requested(args, &mut out)? {
        return Ok(());
    }

    let spec = PipelineSpec::from(args);
    let path = &args.model.model;
    match create_template(&spec, path) {
        Ok(_) => Ok(()),
        Err(PipelineError::ModuleNotFound {
            family,
            name,
            available,
        }) => {
            writeln!(out, "available {family} modules: {}", available.join(", "))?;
            bail!("no {family} module with the name: {name}")
        }
        Err(e) => Err(e).with_context(|| format!("could not create {}", path.display())),
    }
}

/// Print the names of every family whose flag is `list`. True if anything
/// was listed.
fn list_requested(args: &CreateArgs, out: &mut impl Write) -> Result<bool> {
    let plain = |names: Vec<&'static str>| names.into_iter().map(String::from).collect::<Vec<_>>();
    let families = [
        (&args.preprocessing, PREPROCESSING.family(), plain(PREPROCESSING.names())),
        (&args.features, FEATURE_EXTRACTION.family(), plain(FEATURE_EXTRACTION.names())),
        (&args.classifier, CLASSIFIERS.family(), classifier_names()),
        (&args.postprocessing, POSTPROCESSING.family(), plain(POSTPROCESSING.names())),
    ];

    let mut listed = false;
    for (flag, family, names) in families {
        if flag.as_deref().map(str::trim) == Some(LIST) {
            writeln!(out, "{family} modules:")?;
            for name in names {
                writeln!(out, "  {name}")?;
            }
            listed = true;
        }
    }
    Ok(listed)
}

/// Classifier names, tagged when they accept whole time series.
fn classifier_names() -> Vec<String> {
    CLASSIFIERS
        .names()
        .into_iter()
        .map(|name| {
            let timeseries = CLASSIFIERS
                .create(name)
                .is_some_and(|c| c.timeseries_compatible());
            if timeseries {
                format!("{name} (timeseries)")
            } else {
                name.to_string()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// train
// ---------------------------------------------------------------------------

pub fn train(args: &TrainArgs) -> Result<()> {
    train_to(args, &mut io::stdout().lock())
}

/// Train and save; entries held out by a fractional `--num-samples` are
/// written to `out` in the input format.
fn train_to(args: &TrainArgs, out: &mut impl Write) -> Result<()> {
    let path = &args.model.model;
    let limit = TrainingLimit::from_num_samples(args.num_samples)?;
    let mut pipeline = load_pipeline(path)?;
    let mut loaded = load(&args.data)?;

    let held_out = match limit {
        TrainingLimit::All => None,
        TrainingLimit::First(n) => {
            loaded.dataset.truncate(n);
            info!("training limited to the first {} entries", loaded.dataset.len());
            None
        }
        TrainingLimit::Fraction(fraction) => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Some(loaded.dataset.holdout(fraction, &mut rng))
        }
    };

    let cv = pipeline
        .train_with_folds(&loaded.dataset, args.k_folds, args.stratified)
        .context("training failed")?;
    if let Some(cv) = cv {
        info!("{}", fold_summary(args.k_folds, &cv));
    }
    info!("classes: {}", pipeline.class_names().join(", "));

    pipeline
        .save(path)
        .with_context(|| format!("could not save pipeline to {}", path.display()))?;
    info!("trained pipeline saved to {}", path.display());

    if let Some(held_out) = held_out {
        write_dataset(&held_out, out)?;
        out.flush()?;
    }
    Ok(())
}

/// Reports the requested fold count, not the number of evaluated folds.
fn fold_summary(folds: usize, cv: &CrossValidation) -> String {
    format!("{folds}-fold accuracy: {:.2}%", cv.mean_accuracy() * 100.0)
}

// ---------------------------------------------------------------------------
// predict
// ---------------------------------------------------------------------------

pub fn predict(args: &PredictArgs) -> Result<()> {
    let mut pipeline = load_pipeline(&args.model.model)?;
    if !pipeline.is_trained() {
        bail!("{} holds an untrained pipeline", args.model.model.display());
    }
    let loaded = load(&args.data)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(io::stdout().lock());
    let summary = write_predictions(&mut pipeline, &loaded, &mut writer)?;
    writer.flush()?;

    info!(
        "accuracy: {:.2}% ({} of {} correct, {} rejected)",
        summary.accuracy() * 100.0,
        summary.correct,
        summary.total,
        summary.rejected
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct PredictionSummary {
    total: usize,
    correct: usize,
    rejected: usize,
}

impl PredictionSummary {
    fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// One `<predicted> <actual>` record per dataset entry, `NULL` for a
/// rejected prediction.
fn write_predictions<W: Write>(
    pipeline: &mut Pipeline,
    loaded: &LoadedData,
    writer: &mut csv::Writer<W>,
) -> Result<PredictionSummary> {
    let actual_names = loaded.labels.labels();
    let mut summary = PredictionSummary::default();

    for (label, rows) in loaded.dataset.sequences() {
        let actual = actual_names.get(label).map(String::as_str).unwrap_or("NULL");
        let predicted = match pipeline.predict(&rows)? {
            Some(index) => match pipeline.class_name(index) {
                Some(name) => name.to_string(),
                None => {
                    warn!("classifier returned unknown class index {index}");
                    index.to_string()
                }
            },
            None => {
                summary.rejected += 1;
                "NULL".to_string()
            }
        };

        summary.total += 1;
        if predicted == actual {
            summary.correct += 1;
        }
        writer.write_record([predicted.as_str(), actual])?;
    }
    Ok(summary)
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

pub fn info(args: &DataArgs) -> Result<()> {
    let loaded = load(args)?;
    let mut out = io::stdout().lock();
    write_info(&loaded, &mut out)?;
    Ok(())
}

fn write_info(loaded: &LoadedData, out: &mut impl Write) -> io::Result<()> {
    let s = &loaded.signals;
    writeln!(out, "DataType: {}", loaded.data_type)?;
    writeln!(out, "Signals:")?;
    writeln!(out, "  AllLabelsNumeric: {}", s.all_labels_numeric)?;
    writeln!(out, "  AllBlockSizesEqual: {}", s.all_block_sizes_equal)?;
    writeln!(out, "  LabelsEqualWithinBlock: {}", s.labels_equal_within_block)?;
    writeln!(out, "  AllSampleDimsEqual: {}", s.all_sample_dims_equal)?;
    writeln!(out, "  DataDimIsOne: {}", s.data_dim_is_one)?;
    writeln!(out, "Labels: {}", loaded.labels.labels().join(", "))?;
    write!(out, "{}", loaded.dataset)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn load_pipeline(path: &Path) -> Result<Pipeline> {
    Pipeline::load(path).with_context(|| format!("could not load pipeline from {}", path.display()))
}

fn load(args: &DataArgs) -> Result<LoadedData> {
    let hint = parse_hint(args.datatype.as_deref())?;
    load_path(&args.data, hint)
}
