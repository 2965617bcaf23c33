//! Reading a VIA dataset into annotated items.

use log::{debug, info, warn};
use std::path::Path;

use crate::config::VIA_REGION_FILE;
use crate::error::{ConvertError, Result};
use crate::geometry::polygon_to_object;
use crate::types::{ClassTable, Item, ProcessingStats, ViaImageMetadata, VIA_SUBSETS};
use crate::utils::{create_progress_bar, read_image_dimensions, read_via_json};

/// Read the `train` and `val` subsets of a VIA dataset, in that order.
///
/// With a `test_limit`, reading of each subset stops as soon as more than
/// `test_limit` items have been read in total, so up to `test_limit + 1`
/// items are returned.
pub fn read_via_dataset(
    root: &Path,
    test_limit: Option<usize>,
    classes: &ClassTable,
    stats: &mut ProcessingStats,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();

    for subset in VIA_SUBSETS {
        let subset_dir = root.join(subset);
        let entries = read_via_json(&subset_dir.join(VIA_REGION_FILE))?;
        info!(
            "Reading {} VIA dataset ({} images)...",
            subset,
            entries.len()
        );

        let pb = create_progress_bar(entries.len() as u64, subset);
        for (_, metadata) in &entries {
            if test_limit.is_some_and(|limit| items.len() > limit) {
                break;
            }
            items.push(read_item(&subset_dir, metadata, classes, stats)?);
            pb.inc(1);
        }
        pb.finish_with_message(format!("{} read", subset));
    }

    stats.images_read = items.len();
    Ok(items)
}

/// Build the item for one image entry; images without polygons yield an empty item.
pub fn read_item(
    subset_dir: &Path,
    metadata: &ViaImageMetadata,
    classes: &ClassTable,
    stats: &mut ProcessingStats,
) -> Result<Item> {
    let mut item = Item::new(subset_dir.join(&metadata.filename));
    let (width, height) = read_image_dimensions(&item.image)?;

    for region in &metadata.regions {
        let shape = &region.shape_attributes;
        if !shape.is_polygon() {
            debug!(
                "Skipping {} region in {}",
                shape.name,
                item.image.display()
            );
            stats.skipped_shapes += 1;
            continue;
        }

        let Some(cls) = classes.resolve(region) else {
            warn!(
                "Skipping region with missing or unknown class in {}",
                item.image.display()
            );
            stats.skipped_unknown_class += 1;
            continue;
        };

        let object =
            polygon_to_object(cls, &shape.all_points_x, &shape.all_points_y, width, height)
                .map_err(|source| ConvertError::InvalidPolygon {
                    image: item.image.clone(),
                    source,
                })?;
        item.objects.push(object);
        stats.objects_read += 1;
    }

    Ok(item)
}
