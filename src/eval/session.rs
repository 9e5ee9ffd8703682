//! Evaluation session driving confusion accumulation over a dataset.
//!
//! This module provides [`EvalSession`], the main entry point for
//! segmentation evaluation. An external inference provider supplies
//! predicted label grids through a callback, and the session handles
//! confusion accumulation, IoU derivation, and report generation.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::confusion::{compute_image_counts, ClassSpec, ConfusionTable};
use crate::dataset::{Dataset, Sample};
use crate::error::Result;
use crate::eval::report::{EvaluationReport, ImageCounts};
use crate::grid::LabelGrid;

/// Inference provider callback type.
///
/// Given a dataset sample, returns the predicted label grid for its image.
/// The prediction must use the same length and row-major ordering as the
/// sample's ground-truth grid.
pub type InferFn = Box<dyn Fn(&Sample) -> Result<LabelGrid> + Send + Sync>;

/// Configuration for an evaluation session.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Class-indexing and pixel-filtering configuration.
    pub class_spec: ClassSpec,

    /// Directory for report output (JSON, CSV).
    pub report_dir: PathBuf,

    /// Keep per-image confusion tables in the report.
    pub per_image: bool,

    /// Print progress to stderr as images are accumulated.
    pub progress: bool,
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    class_spec: Option<ClassSpec>,
    report_dir: Option<PathBuf>,
    per_image: bool,
    progress: bool,
}

impl EvalConfigBuilder {
    /// Set the class spec.
    #[must_use]
    pub fn class_spec(mut self, spec: ClassSpec) -> Self {
        self.class_spec = Some(spec);
        self
    }

    /// Set the report output directory.
    #[must_use]
    pub fn report_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(path.into());
        self
    }

    /// Keep per-image confusion tables in the report.
    #[must_use]
    pub fn per_image(mut self, enabled: bool) -> Self {
        self.per_image = enabled;
        self
    }

    /// Print progress to stderr as images are accumulated.
    #[must_use]
    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Panics
    ///
    /// Panics if `class_spec` is not set.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        EvalConfig {
            class_spec: self.class_spec.expect("class_spec is required"),
            report_dir: self.report_dir.unwrap_or_else(|| PathBuf::from("reports")),
            per_image: self.per_image,
            progress: self.progress,
        }
    }
}

/// Evaluation session for segmentation quality.
///
/// # Example
///
/// ```rust,ignore
/// use seg_eval::{ClassSpec, EvalConfig, EvalSession};
///
/// let config = EvalConfig::builder()
///     .class_spec(ClassSpec::ade20k_raw())
///     .report_dir("./reports")
///     .build();
///
/// let session = EvalSession::new(config);
/// let report = session.evaluate("validation", pairs)?;
/// println!("{report}");
/// ```
pub struct EvalSession {
    config: EvalConfig,
}

impl EvalSession {
    /// Create a new evaluation session.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate a lazy sequence of `(predicted, ground_truth)` pairs.
    ///
    /// Pairs are consumed in order, one at a time; the sequence may be
    /// backed by file I/O or live inference. Accumulation is single-pass:
    /// each pair is fully folded into the running totals before the next
    /// one is pulled.
    ///
    /// # Errors
    ///
    /// A pair with mismatched grid lengths, or an error yielded by the
    /// sequence itself, aborts the pass with no partial report.
    pub fn evaluate<I>(&self, name: &str, pairs: I) -> Result<EvaluationReport>
    where
        I: IntoIterator<Item = Result<(LabelGrid, LabelGrid)>>,
    {
        let mut table = ConfusionTable::new(self.config.class_spec);
        let mut per_image = Vec::new();
        let mut images = 0usize;

        for pair in pairs {
            let (predicted, ground_truth) = pair?;
            images += 1;

            if self.config.per_image {
                let delta =
                    compute_image_counts(&predicted, &ground_truth, self.config.class_spec)?;
                per_image.push(ImageCounts::from_table(images.to_string(), &delta));
                table.merge(&delta);
            } else {
                table.accumulate_image(&predicted, &ground_truth)?;
            }

            if self.config.progress {
                eprintln!("{images}");
            }
        }

        Ok(EvaluationReport::from_table(
            name.to_string(),
            &table,
            images,
            per_image,
        ))
    }

    /// Evaluate a dataset against an inference provider, in parallel.
    ///
    /// Samples are processed on the rayon thread pool. Each worker owns an
    /// independent confusion table for its image, and the per-image tables
    /// are merged in sample order, so the totals match a sequential pass
    /// exactly.
    ///
    /// # Errors
    ///
    /// The first ground-truth load failure, provider failure, or shape
    /// mismatch aborts the pass.
    pub fn evaluate_dataset(&self, dataset: &Dataset, infer: &InferFn) -> Result<EvaluationReport> {
        let samples: Vec<Sample> = dataset.samples().collect();

        let deltas: Vec<(String, ConfusionTable)> = samples
            .par_iter()
            .map(|sample| {
                let ground_truth = dataset.ground_truth(sample)?;
                let predicted = infer(sample)?;
                let delta =
                    compute_image_counts(&predicted, &ground_truth, self.config.class_spec)?;
                if self.config.progress {
                    eprintln!("{}", sample.name);
                }
                Ok((sample.name.clone(), delta))
            })
            .collect::<Result<_>>()?;

        let mut table = ConfusionTable::new(self.config.class_spec);
        let mut per_image = Vec::new();
        for (name, delta) in &deltas {
            table.merge(delta);
            if self.config.per_image {
                per_image.push(ImageCounts::from_table(name.clone(), delta));
            }
        }

        Ok(EvaluationReport::from_table(
            dataset.name.clone(),
            &table,
            deltas.len(),
            per_image,
        ))
    }

    /// Write a report to the configured report directory as JSON, plus a
    /// CSV per-class summary.
    ///
    /// # Errors
    ///
    /// Propagates directory creation, serialization, and write failures.
    pub fn write_report(&self, report: &EvaluationReport) -> Result<()> {
        std::fs::create_dir_all(&self.config.report_dir)?;

        let json_path = self.config.report_dir.join(format!("{}.json", report.name));
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(json_path, json)?;

        let csv_path = self.config.report_dir.join(format!("{}.csv", report.name));
        write_csv_summary(report, &csv_path)?;

        Ok(())
    }
}

/// Write the per-class CSV summary for a report.
fn write_csv_summary(report: &EvaluationReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["class", "tp", "fp", "fn", "iou"])?;

    for class in &report.classes {
        wtr.write_record([
            &class.class_id.to_string(),
            &class.counts.true_positives.to_string(),
            &class.counts.false_positives.to_string(),
            &class.counts.false_negatives.to_string(),
            &class.iou.map_or(String::new(), |v| format!("{v:.6}")),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn grid(labels: &[u8]) -> LabelGrid {
        LabelGrid::from_raw(labels.to_vec(), labels.len(), 1).unwrap()
    }

    fn test_config() -> EvalConfig {
        EvalConfig::builder()
            .class_spec(ClassSpec::new(3))
            .report_dir("/tmp/seg-eval-test")
            .build()
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = test_config();
        assert_eq!(config.report_dir, PathBuf::from("/tmp/seg-eval-test"));
        assert!(!config.per_image);
        assert!(!config.progress);
    }

    #[test]
    fn test_evaluate_pairs() {
        let session = EvalSession::new(test_config());
        let pairs = vec![
            Ok((grid(&[1, 1]), grid(&[1, 2]))),
            Ok((grid(&[2, 2]), grid(&[2, 2]))),
        ];
        let report = session.evaluate("two-images", pairs).unwrap();

        assert_eq!(report.images, 2);
        assert_eq!(report.pixels, 4);
        let class2 = report.class(2).unwrap();
        assert_eq!(class2.counts.true_positives, 2);
        assert_eq!(class2.counts.false_negatives, 1);
    }

    #[test]
    fn test_evaluate_empty_sequence() {
        let session = EvalSession::new(test_config());
        let report = session.evaluate("empty", Vec::new()).unwrap();
        assert_eq!(report.images, 0);
        assert!(report.mean_iou.is_none());
    }

    #[test]
    fn test_evaluate_aborts_on_shape_mismatch() {
        let session = EvalSession::new(test_config());
        let pairs = vec![
            Ok((grid(&[1, 1]), grid(&[1, 1]))),
            Ok((grid(&[1, 1, 1]), grid(&[1, 1]))),
        ];
        let err = session.evaluate("bad", pairs).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_evaluate_aborts_on_collaborator_error() {
        let session = EvalSession::new(test_config());
        let pairs = vec![
            Ok((grid(&[1]), grid(&[1]))),
            Err(Error::Dataset("missing sample".to_string())),
        ];
        assert!(session.evaluate("bad", pairs).is_err());
    }

    #[test]
    fn test_per_image_reporting_matches_totals() {
        let config = EvalConfig::builder()
            .class_spec(ClassSpec::new(3))
            .per_image(true)
            .build();
        let session = EvalSession::new(config);
        let pairs = vec![
            Ok((grid(&[1, 2]), grid(&[1, 1]))),
            Ok((grid(&[2, 2]), grid(&[2, 1]))),
        ];
        let report = session.evaluate("per-image", pairs).unwrap();

        assert_eq!(report.per_image.len(), 2);
        // per-image counters sum to the totals
        let tp_sum: u64 = report
            .per_image
            .iter()
            .flat_map(|img| img.classes.iter())
            .filter(|c| c.class_id == 1)
            .map(|c| c.counts.true_positives)
            .sum();
        assert_eq!(tp_sum, report.class(1).unwrap().counts.true_positives);
    }

    #[test]
    fn test_evaluate_dataset_parallel() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("annotations/raw")).unwrap();

        let dataset =
            crate::dataset::Dataset::new("mini", dir.path(), "img_", 3, 1, 4).with_dimensions(2, 2);
        for sample in dataset.samples() {
            std::fs::write(&sample.annotation_path, [1u8, 1, 2, 2]).unwrap();
        }

        let session = EvalSession::new(test_config());
        // predict class 1 everywhere
        let infer: InferFn = Box::new(|_| LabelGrid::from_raw(vec![1, 1, 1, 1], 2, 2));
        let report = session.evaluate_dataset(&dataset, &infer).unwrap();

        assert_eq!(report.name, "mini");
        assert_eq!(report.images, 4);
        assert_eq!(report.pixels, 16);
        let class1 = report.class(1).unwrap();
        assert_eq!(class1.counts.true_positives, 8);
        assert_eq!(class1.counts.false_positives, 8);
        assert_eq!(class1.iou, Some(0.5));
        let class2 = report.class(2).unwrap();
        assert_eq!(class2.counts.false_negatives, 8);
        assert_eq!(class2.iou, Some(0.0));
    }

    #[test]
    fn test_evaluate_dataset_missing_annotation_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("annotations/raw")).unwrap();

        let dataset =
            crate::dataset::Dataset::new("gap", dir.path(), "img_", 3, 1, 2).with_dimensions(2, 2);
        // only the first sample exists on disk
        std::fs::write(&dataset.sample(1).annotation_path, [1u8, 1, 2, 2]).unwrap();

        let session = EvalSession::new(test_config());
        let infer: InferFn = Box::new(|_| LabelGrid::from_raw(vec![1, 1, 1, 1], 2, 2));
        let err = session.evaluate_dataset(&dataset, &infer).unwrap_err();
        assert!(matches!(err, Error::GroundTruthLoad { .. }));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = EvalConfig::builder()
            .class_spec(ClassSpec::new(3))
            .report_dir(dir.path())
            .build();
        let session = EvalSession::new(config);
        let report = session
            .evaluate("written", vec![Ok((grid(&[1, 2]), grid(&[1, 2])))])
            .unwrap();
        session.write_report(&report).unwrap();

        let json = std::fs::read_to_string(dir.path().join("written.json")).unwrap();
        assert!(json.contains("\"mean_iou\": 1.0"));

        let csv = std::fs::read_to_string(dir.path().join("written.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("class,tp,fp,fn,iou"));
        assert_eq!(lines.next(), Some("0,0,0,0,"));
        assert_eq!(lines.next(), Some("1,1,0,0,1.000000"));
    }
}
