//! # seg-eval
//!
//! Semantic-segmentation evaluation library.
//!
//! This library provides an **API-first design** where an external crate
//! provides the inference callback, and this library handles confusion
//! statistics, per-class IoU, mean IoU, and report generation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use seg_eval::{ClassSpec, Dataset, EvalConfig, EvalSession};
//!
//! let config = EvalConfig::builder()
//!     .class_spec(ClassSpec::ade20k_raw())
//!     .report_dir("./reports")
//!     .build();
//!
//! let session = EvalSession::new(config);
//! let dataset = Dataset::ade20k_val("/tmp/ade20k_512");
//!
//! let report = session.evaluate_dataset(&dataset, &Box::new(|sample| {
//!     // Your inference logic here
//!     Ok(predicted_label_grid)
//! }))?;
//!
//! println!("{report}");
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`grid`]: Per-pixel class label grids
//! - [`confusion`]: Confusion statistics and IoU computation
//! - [`eval`]: Evaluation session and report generation
//! - [`dataset`]: Dataset enumeration and raw annotation loading
//! - [`stats`]: Summary statistics over per-class IoUs

pub mod confusion;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod grid;
pub mod stats;

// Re-export commonly used types
pub use confusion::{compute_image_counts, ClassCount, ClassSpec, ConfusionTable};
pub use dataset::{load_raw_labels, Dataset, Sample};
pub use error::{Error, Result};
pub use eval::{
    report::{ClassIou, EvaluationReport, ImageCounts},
    session::{EvalConfig, EvalSession, InferFn},
};
pub use grid::LabelGrid;
pub use stats::Summary;
