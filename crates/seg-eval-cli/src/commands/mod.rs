//! CLI command implementations.

pub mod dataset;
pub mod evaluate;
pub mod stats;

use anyhow::{bail, Context, Result};
use seg_eval::Dataset;

use crate::DatasetArgs;

/// Resolve the dataset description from a manifest file or naming flags.
pub fn resolve_dataset(args: &DatasetArgs) -> Result<Dataset> {
    if let Some(manifest) = &args.manifest {
        return Dataset::load(manifest)
            .with_context(|| format!("Failed to load manifest {}", manifest.display()));
    }

    let Some(root) = &args.root else {
        bail!("either --manifest or --root is required");
    };

    let name = root
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    Ok(Dataset::new(
        name,
        root,
        args.prefix.clone(),
        args.pad_width,
        args.first,
        args.last,
    )
    .with_dimensions(args.width, args.height))
}
