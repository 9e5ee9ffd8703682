//! Evaluation session and report generation.
//!
//! This module provides the dataset-level evaluation infrastructure:
//!
//! - [`session::EvalSession`]: drives confusion accumulation over a dataset
//! - [`session::EvalConfig`]: configuration for an evaluation pass
//! - [`report`]: report types for evaluation results

pub mod report;
pub mod session;

pub use report::{ClassIou, EvaluationReport, ImageCounts};
pub use session::{EvalConfig, EvalSession, InferFn};
