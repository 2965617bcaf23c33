//! Writing split items as a YOLO dataset.
//!
//! Writing happens in two steps. [`plan_writes`] decides, single-threaded, which
//! image goes where and which lines end up in each label file, so that every
//! destination path appears exactly once in the plan. [`execute_plan`] then
//! copies images and flushes label files in parallel.

use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{CollisionPolicy, DATASET_YAML};
use crate::error::{ConvertError, Result};
use crate::types::{ClassTable, Item, OutputDirs, ProcessingStats, Split, SplitData};
use crate::utils::{create_progress_bar, ensure_directory};

/// A label file and the lines it will hold, in item order
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFile {
    pub path: PathBuf,
    pub split: Split,
    pub lines: Vec<String>,
    /// Number of items whose boxes were gathered into this file
    pub sources: usize,
}

/// An image copied into one split directory
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub split: Split,
}

/// Everything a dataset write touches, with unique destination paths
#[derive(Debug, Default)]
pub struct WritePlan {
    pub copies: Vec<ImageCopy>,
    pub labels: Vec<LabelFile>,
}

impl WritePlan {
    pub fn collisions(&self) -> impl Iterator<Item = &LabelFile> {
        self.labels.iter().filter(|label| label.sources > 1)
    }

    /// Number of distinct images written into `split`
    pub fn images_in(&self, split: Split) -> usize {
        self.copies.iter().filter(|copy| copy.split == split).count()
    }
}

/// Create `images/{train,val}` and `labels/{train,val}` below `dest`
pub fn setup_output_directories(dest: &Path) -> Result<OutputDirs> {
    let output_dirs = OutputDirs::new(dest);
    for dir in output_dirs.all() {
        ensure_directory(dir)?;
    }
    Ok(output_dirs)
}

/// Output file name of an item's image and the name of its label file.
///
/// The image keeps its source file name; the label file swaps the extension
/// for `.txt`.
pub fn output_names(item: &Item) -> Result<(OsString, OsString)> {
    let file_name = item
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ConvertError::InvalidImagePath {
            path: item.image.clone(),
        })?;

    let mut label_name = Path::new(file_name)
        .file_stem()
        .unwrap_or(file_name)
        .to_os_string();
    label_name.push(".txt");

    Ok((file_name.to_os_string(), label_name))
}

/// Decide destinations for every item of the split.
///
/// Items are keyed by their label file. When several items share one, the
/// policy either fails or merges their lines into one file in item order; a
/// shared image destination keeps the last item's image.
pub fn plan_writes(
    split_data: &SplitData,
    output_dirs: &OutputDirs,
    policy: CollisionPolicy,
) -> Result<WritePlan> {
    let mut plan = WritePlan::default();
    let mut copy_index: HashMap<PathBuf, usize> = HashMap::new();
    let mut label_index: HashMap<PathBuf, usize> = HashMap::new();

    for (split, item) in split_data.iter() {
        let (file_name, label_name) = output_names(item)?;
        let lines = item.objects.iter().map(|object| object.to_label_line());

        let label_path = output_dirs.labels_dir(split).join(&label_name);
        match label_index.get(&label_path) {
            Some(&index) => {
                if policy == CollisionPolicy::Fail {
                    return Err(ConvertError::LabelCollision {
                        split,
                        label: label_name.to_string_lossy().into_owned(),
                    });
                }
                warn!(
                    "{} shares label file {} in {} split with another image, merging boxes",
                    item.image.display(),
                    label_name.to_string_lossy(),
                    split
                );
                let label = &mut plan.labels[index];
                label.lines.extend(lines);
                label.sources += 1;
            }
            None => {
                label_index.insert(label_path.clone(), plan.labels.len());
                plan.labels.push(LabelFile {
                    path: label_path,
                    split,
                    lines: lines.collect(),
                    sources: 1,
                });
            }
        }

        let image_path = output_dirs.images_dir(split).join(&file_name);
        match copy_index.get(&image_path) {
            Some(&index) => plan.copies[index].source = item.image.clone(),
            None => {
                copy_index.insert(image_path.clone(), plan.copies.len());
                plan.copies.push(ImageCopy {
                    source: item.image.clone(),
                    destination: image_path,
                    split,
                });
            }
        }
    }

    Ok(plan)
}

/// Copy images and flush each label file once, in parallel
pub fn execute_plan(plan: &WritePlan, pb: &ProgressBar) -> Result<()> {
    plan.copies.par_iter().try_for_each(|copy| -> Result<()> {
        fs::copy(&copy.source, &copy.destination)
            .map_err(|e| ConvertError::io(&copy.source, e))?;
        pb.inc(1);
        Ok(())
    })?;

    plan.labels
        .par_iter()
        .try_for_each(|label| write_label_file(&label.path, &label.lines))
}

/// Write label lines, newline-terminated, replacing any existing file
pub fn write_label_file(path: &Path, lines: &[String]) -> Result<()> {
    let io_error = |e| ConvertError::io(path, e);
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    for line in lines {
        writeln!(writer, "{}", line).map_err(io_error)?;
    }
    writer.flush().map_err(io_error)
}

/// Lay out the split items below `dest` as a YOLO dataset
pub fn write_dataset(
    dest: &Path,
    split_data: &SplitData,
    policy: CollisionPolicy,
    stats: &mut ProcessingStats,
) -> Result<WritePlan> {
    let output_dirs = setup_output_directories(dest)?;
    let plan = plan_writes(split_data, &output_dirs, policy)?;

    info!(
        "Writing {} images ({} train, {} val)...",
        split_data.len(),
        split_data.train_items.len(),
        split_data.val_items.len()
    );
    let pb = create_progress_bar(plan.copies.len() as u64, "Write");
    execute_plan(&plan, &pb)?;
    pb.finish_with_message("Writing complete");

    stats.train_images = plan.images_in(Split::Train);
    stats.val_images = plan.images_in(Split::Val);
    stats.label_collisions = plan.collisions().count();
    Ok(plan)
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(dest: &Path, classes: &ClassTable) -> Result<()> {
    let dataset_yaml_path = dest.join(DATASET_YAML);
    let absolute_path = fs::canonicalize(dest).map_err(|e| ConvertError::io(dest, e))?;

    let mut yaml_content = format!(
        "path: {}\ntrain: images/train\nval: images/val\ntest:\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");
    for (id, name) in classes.names().iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, name));
    }

    let io_error = |e| ConvertError::io(&dataset_yaml_path, e);
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path).map_err(io_error)?);
    dataset_yaml
        .write_all(yaml_content.as_bytes())
        .map_err(io_error)?;
    dataset_yaml.flush().map_err(io_error)
}
