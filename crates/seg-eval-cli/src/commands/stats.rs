//! Statistics command.

use std::path::Path;

use anyhow::{Context, Result};
use seg_eval::{EvaluationReport, Summary};

pub fn run(input: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading report from: {}", input.display());
    }

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let report: EvaluationReport =
        serde_json::from_str(&content).context("Failed to parse report JSON")?;

    println!("Report: {}", report.name);
    println!("Images: {}, pixels: {}", report.images, report.pixels);
    println!(
        "Classes: {} ({} with defined IoU)",
        report.classes.len(),
        report.defined_ious().len()
    );
    println!();

    println!("Per-class results:");
    println!("{:-<60}", "");
    print!("{report}");

    let ious = report.defined_ious();
    if let Some(summary) = Summary::compute(&ious) {
        println!();
        println!("IoU distribution (defined classes only):");
        println!("{:-<60}", "");
        println!("  Mean: {:.6}, Median: {:.6}", summary.mean, summary.median);
        println!("  Min: {:.6}, Max: {:.6}", summary.min, summary.max);
        println!("  StdDev: {:.6}", summary.std_dev);
    }

    Ok(())
}
