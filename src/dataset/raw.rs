//! Raw annotation decoding.
//!
//! Ground-truth annotations are headerless files holding one class ID byte
//! per pixel in row-major order; the dimensions come from the dataset
//! description, not the file.

use std::path::Path;

use crate::error::{Error, Result};
use crate::grid::LabelGrid;

/// Load a raw label file into a [`LabelGrid`] with the declared dimensions.
///
/// # Errors
///
/// Returns [`Error::GroundTruthLoad`] when the file cannot be read, or
/// [`Error::ShapeMismatch`] when the byte count disagrees with
/// `width * height`.
pub fn load_raw_labels(path: &Path, width: usize, height: usize) -> Result<LabelGrid> {
    let data = std::fs::read(path).map_err(|e| Error::GroundTruthLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    LabelGrid::from_raw(data, width, height)
}
