use log::info;
use std::path::Path;

use crate::config::Args;
use crate::error::Result;
use crate::reader::read_via_dataset;
use crate::split::{make_rng, split_items};
use crate::types::ProcessingStats;
use crate::utils::remove_output_directory;
use crate::writer::{create_dataset_yaml, write_dataset};

/// Run a conversion as described by the command line.
///
/// Returns the processing statistics, or `None` when no VIA source was given
/// and only the optional clear step ran.
pub fn run(args: &Args) -> Result<Option<ProcessingStats>> {
    if args.clear {
        remove_output_directory(&args.dest)?;
    }

    match &args.via {
        Some(via_root) => process_dataset(via_root, args).map(Some),
        None => {
            info!("No source dataset given, nothing to convert.");
            Ok(None)
        }
    }
}

/// Main dataset processing pipeline: read, split, write
pub fn process_dataset(via_root: &Path, args: &Args) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();
    let classes = args.class_table();

    let items = read_via_dataset(via_root, args.test_limit(), &classes, &mut stats)?;
    info!("Read {} images from {}.", items.len(), via_root.display());

    let mut rng = make_rng(args.seed);
    let split_data = split_items(items, args.train_split, &mut rng);

    write_dataset(&args.dest, &split_data, args.on_collision, &mut stats)?;

    info!("Creating dataset.yaml file...");
    create_dataset_yaml(&args.dest, &classes)?;

    stats.print_summary();
    info!("Conversion process completed successfully.");
    Ok(stats)
}
