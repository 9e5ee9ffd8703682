//! Confusion statistics for label-map comparison.
//!
//! This module implements the core of the evaluator: per-pixel comparison of
//! a predicted label grid against a ground-truth grid, classified into
//! per-class true-positive / false-positive / false-negative counts, and a
//! running [`ConfusionTable`] that accumulates those counts across a dataset.
//!
//! Counting is incremental-equivalent: accumulating two images one after the
//! other produces the same table as accumulating the concatenation of their
//! pixels in one pass.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::LabelGrid;

/// Class-indexing and pixel-filtering configuration for one evaluation run.
///
/// Observed datasets disagree on three points, so none of them is
/// hard-coded: the valid class range (`class_base..num_classes`), whether a
/// dedicated ignore sentinel in the ground truth removes a pixel from all
/// counting, and whether a false positive is only counted when the
/// ground-truth value at that pixel is itself a valid class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Exclusive upper bound of valid class IDs.
    pub num_classes: u8,

    /// First counted class ID (0 or 1).
    pub class_base: u8,

    /// Ground-truth sentinel that removes a pixel from all counting.
    pub ignore_label: Option<u8>,

    /// Count a false positive only when the ground-truth value at that
    /// pixel is itself a valid in-range class.
    pub strict_truth: bool,
}

impl ClassSpec {
    /// Plain spec: classes `0..num_classes`, no ignore sentinel, false
    /// positives counted whenever the predicted class is in range.
    #[must_use]
    pub fn new(num_classes: u8) -> Self {
        Self {
            num_classes,
            class_base: 0,
            ignore_label: None,
            strict_truth: false,
        }
    }

    /// Profile for raw ADE20K-style annotations: classes `1..32`, no
    /// ignore sentinel, ground-truth values outside the class range
    /// silently excluded from false-positive counting.
    #[must_use]
    pub fn ade20k_raw() -> Self {
        Self {
            num_classes: 32,
            class_base: 1,
            ignore_label: None,
            strict_truth: true,
        }
    }

    /// Profile honoring an explicit ignore sentinel: classes
    /// `0..num_classes`, pixels whose ground truth equals `ignore` skipped
    /// entirely.
    #[must_use]
    pub fn with_ignore_label(num_classes: u8, ignore: u8) -> Self {
        Self {
            num_classes,
            class_base: 0,
            ignore_label: Some(ignore),
            strict_truth: false,
        }
    }

    /// Number of counted classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        usize::from(self.num_classes.saturating_sub(self.class_base))
    }

    /// Iterate over the counted class IDs.
    pub fn class_ids(&self) -> impl Iterator<Item = u8> {
        self.class_base..self.num_classes
    }

    fn in_range(&self, value: u8) -> bool {
        value >= self.class_base && value < self.num_classes
    }
}

/// Per-class confusion counters.
///
/// Monotonically non-decreasing during accumulation; never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    /// Pixels where prediction and ground truth both equal this class.
    pub true_positives: u64,

    /// Pixels predicted as this class whose ground truth is another class.
    pub false_positives: u64,

    /// Pixels of this class predicted as another class.
    pub false_negatives: u64,
}

impl ClassCount {
    /// Sum of all three counters: the IoU denominator for this class.
    #[must_use]
    pub fn denominator(&self) -> u64 {
        self.true_positives + self.false_positives + self.false_negatives
    }

    /// Intersection-over-union for this class.
    ///
    /// `None` when the class never appeared as prediction or ground truth
    /// (zero denominator): the ratio is undefined and the class is excluded
    /// from the mean rather than counted as `0/0`.
    #[must_use]
    pub fn iou(&self) -> Option<f64> {
        let denominator = self.denominator();
        if denominator == 0 {
            None
        } else {
            Some(self.true_positives as f64 / denominator as f64)
        }
    }

    /// Element-wise addition of another class's counters into this one.
    pub fn merge(&mut self, other: &Self) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Running per-class confusion totals for one evaluation pass.
///
/// Created empty, mutated only through [`accumulate_image`] and [`merge`],
/// and read once at the end of the pass to derive per-class IoU. Not shared
/// across concurrent passes; for parallel evaluation each worker owns an
/// independent table over a disjoint image subset and the results are
/// combined with [`merge`] (element-wise addition is commutative and
/// associative, so merge order does not affect totals).
///
/// [`accumulate_image`]: ConfusionTable::accumulate_image
/// [`merge`]: ConfusionTable::merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionTable {
    spec: ClassSpec,
    counts: Vec<ClassCount>,
    pixels: u64,
}

impl ConfusionTable {
    /// Create an empty table for the given class spec.
    #[must_use]
    pub fn new(spec: ClassSpec) -> Self {
        Self {
            spec,
            counts: vec![ClassCount::default(); spec.class_count()],
            pixels: 0,
        }
    }

    /// The class spec this table was created with.
    #[must_use]
    pub fn spec(&self) -> ClassSpec {
        self.spec
    }

    /// Counters for one class, or `None` when the ID is outside the counted
    /// range.
    #[must_use]
    pub fn count(&self, class_id: u8) -> Option<&ClassCount> {
        if self.spec.in_range(class_id) {
            self.counts.get(usize::from(class_id - self.spec.class_base))
        } else {
            None
        }
    }

    /// Iterate over `(class_id, counters)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ClassCount)> {
        self.spec.class_ids().zip(self.counts.iter())
    }

    /// Non-ignored pixels accumulated so far.
    #[must_use]
    pub fn pixels(&self) -> u64 {
        self.pixels
    }

    /// Accumulate one image's confusion counts into the running totals.
    ///
    /// A single pass over the pixels applies the per-class trichotomy:
    /// a matching pixel counts one true positive for its class; a mismatch
    /// counts one false positive for the predicted class and one false
    /// negative for the ground-truth class, each subject to the configured
    /// class range and filtering rules. Ground-truth pixels equal to the ignore
    /// sentinel contribute nothing to any class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] when the grids disagree in pixel
    /// count. Dimensions beyond the pixel count are the caller's
    /// responsibility.
    pub fn accumulate_image(
        &mut self,
        predicted: &LabelGrid,
        ground_truth: &LabelGrid,
    ) -> Result<()> {
        if predicted.len() != ground_truth.len() {
            return Err(Error::ShapeMismatch {
                expected: ground_truth.len(),
                actual: predicted.len(),
            });
        }

        let spec = self.spec;
        for (p, g) in predicted.pixels().zip(ground_truth.pixels()) {
            if spec.ignore_label == Some(g) {
                continue;
            }
            self.pixels += 1;

            if p == g {
                if spec.in_range(p) {
                    self.counts[usize::from(p - spec.class_base)].true_positives += 1;
                }
            } else {
                if spec.in_range(p) && (!spec.strict_truth || spec.in_range(g)) {
                    self.counts[usize::from(p - spec.class_base)].false_positives += 1;
                }
                if spec.in_range(g) {
                    self.counts[usize::from(g - spec.class_base)].false_negatives += 1;
                }
            }
        }

        Ok(())
    }

    /// Element-wise addition of another table's counters into this one.
    ///
    /// Both tables must have been created with the same [`ClassSpec`].
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(self.spec, other.spec, "merging tables with different class specs");
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            mine.merge(theirs);
        }
        self.pixels += other.pixels;
    }

    /// Mean of the defined per-class IoUs.
    ///
    /// `None` when no class has a defined IoU (empty dataset). Classes with
    /// a zero denominator are excluded from the average.
    #[must_use]
    pub fn mean_iou(&self) -> Option<f64> {
        let defined: Vec<f64> = self.counts.iter().filter_map(ClassCount::iou).collect();
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        }
    }
}

/// Compute one image's per-class confusion counts.
///
/// Pure function of its inputs: the same two grids always produce the same
/// table. Equivalent to accumulating the image into a fresh
/// [`ConfusionTable`].
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] when the grids disagree in pixel count.
pub fn compute_image_counts(
    predicted: &LabelGrid,
    ground_truth: &LabelGrid,
    spec: ClassSpec,
) -> Result<ConfusionTable> {
    let mut table = ConfusionTable::new(spec);
    table.accumulate_image(predicted, ground_truth)?;
    Ok(table)
}
