//! Report types for evaluation results.
//!
//! This module defines the data structures for evaluation reports that can
//! be serialized to JSON or CSV, plus the plain-text rendering printed by
//! the CLI.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confusion::{ClassCount, ClassSpec, ConfusionTable};

/// Final per-class result: accumulated counters and the derived IoU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassIou {
    /// Class ID.
    pub class_id: u8,

    /// Accumulated confusion counters for this class.
    pub counts: ClassCount,

    /// Intersection-over-union. `None` when the class never appeared as
    /// prediction or ground truth (undefined ratio, excluded from the
    /// mean).
    pub iou: Option<f64>,
}

/// Per-image confusion counts, kept when per-image reporting is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCounts {
    /// Image name or 1-based index within the pass.
    pub name: String,

    /// This image's per-class counters.
    pub classes: Vec<ClassIou>,
}

impl ImageCounts {
    /// Build per-image counts from a single-image confusion table.
    #[must_use]
    pub fn from_table(name: String, table: &ConfusionTable) -> Self {
        Self {
            name,
            classes: summarize(table),
        }
    }
}

/// Report for one evaluation pass over a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Evaluation name or dataset identifier.
    pub name: String,

    /// Class spec the pass was configured with.
    pub class_spec: ClassSpec,

    /// Per-class counters and IoU, in class order.
    pub classes: Vec<ClassIou>,

    /// Mean of the defined per-class IoUs. `None` when no class has a
    /// defined IoU.
    pub mean_iou: Option<f64>,

    /// Number of images accumulated.
    pub images: usize,

    /// Non-ignored pixels accumulated across the dataset.
    pub pixels: u64,

    /// Per-image counts (empty unless per-image reporting was enabled).
    #[serde(default)]
    pub per_image: Vec<ImageCounts>,

    /// When this report was generated.
    pub timestamp: DateTime<Utc>,
}

impl EvaluationReport {
    /// Derive a report from an accumulated confusion table.
    #[must_use]
    pub fn from_table(
        name: String,
        table: &ConfusionTable,
        images: usize,
        per_image: Vec<ImageCounts>,
    ) -> Self {
        Self {
            name,
            class_spec: table.spec(),
            classes: summarize(table),
            mean_iou: table.mean_iou(),
            images,
            pixels: table.pixels(),
            per_image,
            timestamp: Utc::now(),
        }
    }

    /// Result for a specific class.
    #[must_use]
    pub fn class(&self, class_id: u8) -> Option<&ClassIou> {
        self.classes.iter().find(|c| c.class_id == class_id)
    }

    /// The defined per-class IoU values, in class order.
    #[must_use]
    pub fn defined_ious(&self) -> Vec<f64> {
        self.classes.iter().filter_map(|c| c.iou).collect()
    }
}

/// Derive the per-class result rows from a confusion table.
#[must_use]
pub fn summarize(table: &ConfusionTable) -> Vec<ClassIou> {
    table
        .iter()
        .map(|(class_id, counts)| ClassIou {
            class_id,
            counts: *counts,
            iou: counts.iou(),
        })
        .collect()
}

impl fmt::Display for EvaluationReport {
    /// Plain-text rendering: one line per class with the three counters and
    /// the IoU, then the overall mean.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.classes {
            write!(
                f,
                "IOU class {}: {}, {}, {}, ",
                class.class_id,
                class.counts.true_positives,
                class.counts.false_positives,
                class.counts.false_negatives,
            )?;
            match class.iou {
                Some(iou) => writeln!(f, "{iou:.6}")?,
                None => writeln!(f, "undefined")?,
            }
        }
        match self.mean_iou {
            Some(mean) => writeln!(f, "mIOU over_all: {mean:.6}"),
            None => writeln!(f, "mIOU over_all: undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confusion::compute_image_counts;
    use crate::grid::LabelGrid;

    fn sample_report() -> EvaluationReport {
        let predicted = LabelGrid::from_raw(vec![1, 1, 2, 2], 4, 1).unwrap();
        let truth = LabelGrid::from_raw(vec![1, 2, 2, 2], 4, 1).unwrap();
        let table = compute_image_counts(&predicted, &truth, ClassSpec::new(3)).unwrap();
        EvaluationReport::from_table("sample".to_string(), &table, 1, Vec::new())
    }

    #[test]
    fn test_report_from_table() {
        let report = sample_report();
        assert_eq!(report.classes.len(), 3);
        assert_eq!(report.images, 1);
        assert_eq!(report.pixels, 4);

        let class1 = report.class(1).unwrap();
        assert_eq!(class1.counts.true_positives, 1);
        assert_eq!(class1.iou, Some(0.5));
        assert!(report.class(0).unwrap().iou.is_none());
        assert_eq!(report.defined_ious().len(), 2);
    }

    #[test]
    fn test_display_format() {
        let report = sample_report();
        let text = report.to_string();
        assert!(text.contains("IOU class 0: 0, 0, 0, undefined"));
        assert!(text.contains("IOU class 1: 1, 1, 0, 0.500000"));
        assert!(text.contains("IOU class 2: 2, 0, 1, 0.666667"));
        assert!(text.contains("mIOU over_all: 0.583333"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let restored: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, report.name);
        assert_eq!(restored.mean_iou, report.mean_iou);
        assert_eq!(restored.classes.len(), report.classes.len());
        assert_eq!(restored.class(2).unwrap().counts, report.class(2).unwrap().counts);
    }

    #[test]
    fn test_undefined_iou_serializes_as_null() {
        let report = sample_report();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["classes"][0]["iou"].is_null());
    }
}
