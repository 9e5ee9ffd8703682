//! seg-eval CLI - Semantic segmentation evaluation tool

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

/// Semantic segmentation evaluation tool.
#[derive(Parser)]
#[command(name = "seg-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Dataset location and naming scheme.
#[derive(Args)]
pub struct DatasetArgs {
    /// Dataset manifest JSON (overrides the naming flags)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Dataset root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Sample name prefix
    #[arg(long, default_value = "ADE_val_")]
    pub prefix: String,

    /// Zero-padded digit count of the numeric sample ID
    #[arg(long, default_value_t = 8)]
    pub pad_width: usize,

    /// First sample ID (inclusive)
    #[arg(long, default_value_t = 1)]
    pub first: u32,

    /// Last sample ID (inclusive)
    #[arg(long, default_value_t = 2000)]
    pub last: u32,

    /// Grid width in pixels
    #[arg(long, default_value_t = 512)]
    pub width: usize,

    /// Grid height in pixels
    #[arg(long, default_value_t = 512)]
    pub height: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate predictions against ground truth and report per-class IoU
    Evaluate {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Directory of predicted label grids, one <sample>.raw per sample
        #[arg(short, long)]
        predictions: PathBuf,

        /// Exclusive upper bound of valid class IDs
        #[arg(long, default_value_t = 32)]
        num_classes: u8,

        /// First counted class ID (0 or 1)
        #[arg(long, default_value_t = 1)]
        class_base: u8,

        /// Ground-truth value that removes a pixel from all counting
        #[arg(long)]
        ignore_label: Option<u8>,

        /// Count false positives even when the ground-truth value is out of range
        #[arg(long)]
        lenient_truth: bool,

        /// Keep per-image confusion tables in the report
        #[arg(long)]
        per_image: bool,

        /// Write JSON and CSV reports into this directory
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Worker threads (defaults to the number of cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Report name (defaults to the dataset name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show statistics for a saved evaluation report
    Stats {
        /// Input report JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Describe and enumerate datasets
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },
}

#[derive(Subcommand)]
pub enum DatasetAction {
    /// Write a dataset manifest file
    Init {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output manifest file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show dataset information
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// List samples in a dataset
    List {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Maximum number of samples to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            dataset,
            predictions,
            num_classes,
            class_base,
            ignore_label,
            lenient_truth,
            per_image,
            report_dir,
            jobs,
            name,
        } => commands::evaluate::run(
            &dataset,
            &predictions,
            num_classes,
            class_base,
            ignore_label,
            lenient_truth,
            per_image,
            report_dir,
            jobs,
            name,
            cli.verbose,
        ),
        Commands::Stats { input } => commands::stats::run(&input, cli.verbose),
        Commands::Dataset { action } => commands::dataset::run(action, cli.verbose),
    }
}
