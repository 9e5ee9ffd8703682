//! Evaluation command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use seg_eval::{ClassSpec, Error, EvalConfig, EvalSession, InferFn};

use crate::DatasetArgs;

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub fn run(
    dataset_args: &DatasetArgs,
    predictions: &Path,
    num_classes: u8,
    class_base: u8,
    ignore_label: Option<u8>,
    lenient_truth: bool,
    per_image: bool,
    report_dir: Option<PathBuf>,
    jobs: Option<usize>,
    name: Option<String>,
    verbose: bool,
) -> Result<()> {
    let dataset = super::resolve_dataset(dataset_args)?;

    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let class_spec = ClassSpec {
        num_classes,
        class_base,
        ignore_label,
        strict_truth: !lenient_truth,
    };

    if verbose {
        eprintln!(
            "Evaluating {} samples, classes {}..{}",
            dataset.len(),
            class_spec.class_base,
            class_spec.num_classes
        );
    }

    let mut builder = EvalConfig::builder()
        .class_spec(class_spec)
        .per_image(per_image)
        .progress(verbose);
    let write_reports = report_dir.is_some();
    if let Some(dir) = report_dir {
        builder = builder.report_dir(dir);
    }
    let session = EvalSession::new(builder.build());

    let infer = raw_prediction_provider(predictions.to_path_buf(), dataset.width, dataset.height);

    let mut report = session
        .evaluate_dataset(&dataset, &infer)
        .context("Evaluation failed")?;
    if let Some(name) = name {
        report.name = name;
    }

    print!("{report}");

    if write_reports {
        session.write_report(&report).context("Failed to write reports")?;
        if verbose {
            eprintln!(
                "Wrote {}.json and {}.csv to {}",
                report.name,
                report.name,
                session.config().report_dir.display()
            );
        }
    }

    Ok(())
}

/// Inference provider backed by precomputed raw label files: the prediction
/// for sample `X` is read from `<dir>/X.raw`.
fn raw_prediction_provider(dir: PathBuf, width: usize, height: usize) -> InferFn {
    Box::new(move |sample| {
        let path = dir.join(format!("{}.raw", sample.name));
        seg_eval::load_raw_labels(&path, width, height).map_err(|e| Error::Prediction {
            sample: sample.name.clone(),
            message: e.to_string(),
        })
    })
}
