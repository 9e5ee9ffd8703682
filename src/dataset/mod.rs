//! Dataset enumeration for numbered segmentation samples.
//!
//! A [`Dataset`] describes where a validation set lives on disk and how its
//! samples are named: a contiguous numeric range rendered with a fixed
//! zero-padded width, with ground-truth annotations and prediction inputs
//! in parallel subdirectories.
//!
//! ## Example
//!
//! ```rust,ignore
//! use seg_eval::Dataset;
//!
//! let dataset = Dataset::ade20k_val("/tmp/ade20k_512");
//! for sample in dataset.samples() {
//!     let truth = dataset.ground_truth(&sample)?;
//! }
//! ```

mod raw;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::LabelGrid;

pub use raw::load_raw_labels;

/// A dataset of numbered segmentation samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Name of the dataset.
    pub name: String,

    /// Root path of the dataset.
    pub root: PathBuf,

    /// Common sample-name prefix, e.g. `ADE_val_`.
    pub prefix: String,

    /// Zero-padded digit count of the numeric sample ID.
    pub pad_width: usize,

    /// First sample ID (inclusive).
    pub first: u32,

    /// Last sample ID (inclusive).
    pub last: u32,

    /// Annotation subdirectory relative to the root.
    pub annotation_dir: PathBuf,

    /// Annotation file extension (no dot).
    pub annotation_ext: String,

    /// Prediction-input subdirectory relative to the root.
    pub image_dir: PathBuf,

    /// Prediction-input file extension (no dot).
    pub image_ext: String,

    /// Grid width in pixels.
    pub width: usize,

    /// Grid height in pixels.
    pub height: usize,
}

/// One sample: numeric ID plus resolved file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Numeric sample ID.
    pub id: u32,

    /// Zero-padded sample name, e.g. `ADE_val_00000042`.
    pub name: String,

    /// Path to the ground-truth annotation file.
    pub annotation_path: PathBuf,

    /// Path to the prediction input (image) file.
    pub image_path: PathBuf,
}

impl Dataset {
    /// Create a dataset description with the given naming scheme.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        pad_width: usize,
        first: u32,
        last: u32,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            prefix: prefix.into(),
            pad_width,
            first,
            last,
            annotation_dir: PathBuf::from("annotations/raw"),
            annotation_ext: "raw".to_string(),
            image_dir: PathBuf::from("images/bmp"),
            image_ext: "bmp".to_string(),
            width: 512,
            height: 512,
        }
    }

    /// The ADE20K validation split resized to 512x512: samples
    /// `ADE_val_00000001` through `ADE_val_00002000`, raw annotations under
    /// `annotations/raw`, BMP inputs under `images/bmp`.
    #[must_use]
    pub fn ade20k_val(root: impl Into<PathBuf>) -> Self {
        Self::new("ade20k_val", root, "ADE_val_", 8, 1, 2000)
    }

    /// Set the annotation subdirectory and extension.
    #[must_use]
    pub fn with_annotations(mut self, dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        self.annotation_dir = dir.into();
        self.annotation_ext = ext.into();
        self
    }

    /// Set the prediction-input subdirectory and extension.
    #[must_use]
    pub fn with_images(mut self, dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        self.image_dir = dir.into();
        self.image_ext = ext.into();
        self
    }

    /// Set the grid dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Number of samples in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    /// Whether the sample range is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pixel count of one grid.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Resolve one sample by ID.
    #[must_use]
    pub fn sample(&self, id: u32) -> Sample {
        let name = format!("{}{:0width$}", self.prefix, id, width = self.pad_width);
        let annotation_path = self
            .root
            .join(&self.annotation_dir)
            .join(format!("{name}.{}", self.annotation_ext));
        let image_path = self
            .root
            .join(&self.image_dir)
            .join(format!("{name}.{}", self.image_ext));
        Sample {
            id,
            name,
            annotation_path,
            image_path,
        }
    }

    /// Iterate over all samples in ID order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (self.first..=self.last).map(|id| self.sample(id))
    }

    /// Load a sample's ground-truth label grid from its raw annotation
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GroundTruthLoad`](crate::Error::GroundTruthLoad)
    /// when the file cannot be read, or
    /// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) when its byte
    /// count disagrees with the dataset dimensions.
    pub fn ground_truth(&self, sample: &Sample) -> Result<LabelGrid> {
        raw::load_raw_labels(&sample.annotation_path, self.width, self.height)
    }

    /// Load a dataset description from a JSON manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        Ok(dataset)
    }

    /// Save the dataset description to a JSON manifest file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_naming() {
        let dataset = Dataset::ade20k_val("/data/ade20k_512");
        let sample = dataset.sample(42);
        assert_eq!(sample.name, "ADE_val_00000042");
        assert_eq!(
            sample.annotation_path,
            PathBuf::from("/data/ade20k_512/annotations/raw/ADE_val_00000042.raw")
        );
        assert_eq!(
            sample.image_path,
            PathBuf::from("/data/ade20k_512/images/bmp/ADE_val_00000042.bmp")
        );
    }

    #[test]
    fn test_sample_range() {
        let dataset = Dataset::ade20k_val("/data");
        assert_eq!(dataset.len(), 2000);
        let first = dataset.samples().next().unwrap();
        assert_eq!(first.name, "ADE_val_00000001");
        let last = dataset.samples().last().unwrap();
        assert_eq!(last.name, "ADE_val_00002000");
    }

    #[test]
    fn test_empty_range() {
        let dataset = Dataset::new("empty", "/data", "x_", 4, 5, 4);
        assert!(dataset.is_empty());
        assert_eq!(dataset.samples().count(), 0);
    }

    #[test]
    fn test_custom_layout() {
        let dataset = Dataset::new("custom", "/d", "img", 3, 0, 9)
            .with_annotations("gt", "lbl")
            .with_images("inputs", "png")
            .with_dimensions(64, 32);
        let sample = dataset.sample(7);
        assert_eq!(sample.annotation_path, PathBuf::from("/d/gt/img007.lbl"));
        assert_eq!(sample.image_path, PathBuf::from("/d/inputs/img007.png"));
        assert_eq!(dataset.pixel_count(), 64 * 32);
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let dataset = Dataset::ade20k_val("/data").with_dimensions(256, 256);
        dataset.save(&path).unwrap();

        let restored = Dataset::load(&path).unwrap();
        assert_eq!(restored.name, "ade20k_val");
        assert_eq!(restored.width, 256);
        assert_eq!(restored.len(), dataset.len());
    }
}
