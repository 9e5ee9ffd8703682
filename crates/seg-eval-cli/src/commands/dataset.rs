//! Dataset management commands.

use anyhow::{Context, Result};

use crate::DatasetAction;

pub fn run(action: DatasetAction, verbose: bool) -> Result<()> {
    match action {
        DatasetAction::Init { dataset, output } => {
            let dataset = super::resolve_dataset(&dataset)?;
            dataset
                .save(&output)
                .with_context(|| format!("Failed to save manifest to {}", output.display()))?;
            println!("Saved manifest to: {}", output.display());
            Ok(())
        }
        DatasetAction::Info { dataset } => {
            let dataset = super::resolve_dataset(&dataset)?;
            println!("Dataset: {}", dataset.name);
            println!("  Root: {}", dataset.root.display());
            println!("  Samples: {} ({}..={})", dataset.len(), dataset.first, dataset.last);
            println!("  Grid: {}x{} ({} pixels)", dataset.width, dataset.height, dataset.pixel_count());
            println!(
                "  Annotations: {}/*.{}",
                dataset.root.join(&dataset.annotation_dir).display(),
                dataset.annotation_ext
            );
            println!(
                "  Images: {}/*.{}",
                dataset.root.join(&dataset.image_dir).display(),
                dataset.image_ext
            );
            Ok(())
        }
        DatasetAction::List { dataset, limit } => {
            let dataset = super::resolve_dataset(&dataset)?;
            let limit = limit.unwrap_or(usize::MAX);
            for sample in dataset.samples().take(limit) {
                if verbose {
                    println!("{}  {}", sample.name, sample.annotation_path.display());
                } else {
                    println!("{}", sample.name);
                }
            }
            Ok(())
        }
    }
}
