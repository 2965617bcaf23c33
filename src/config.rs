use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::ClassTable;

// Test runs stop reading once more than this many images have been read
pub const TEST_COUNT: usize = 100;

// Default proportion of the dataset assigned to the train split
pub const DEFAULT_TRAIN_SPLIT: f64 = 0.9;

// Name of the VIA annotation file inside each subset directory
pub const VIA_REGION_FILE: &str = "via_region_data.json";

// Name of the dataset description written next to images/ and labels/
pub const DATASET_YAML: &str = "dataset.yaml";

/// Convert a VIA polygon dataset into a YOLO bounding-box dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Path of the output YOLO dataset
    pub dest: PathBuf,

    /// Remove the output dataset directory before writing
    #[arg(long)]
    pub clear: bool,

    /// Test run: convert no more than about 100 images
    #[arg(long)]
    pub test: bool,

    /// Path of the VIA dataset (containing train/ and val/)
    #[arg(long = "via")]
    pub via: Option<PathBuf>,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_split", default_value_t = DEFAULT_TRAIN_SPLIT, value_parser = validate_size)]
    pub train_split: f64,

    /// Seed for random shuffling; shuffles from entropy when omitted
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Region attribute holding the class name; all regions are class 0 when omitted
    #[arg(long = "class_attribute")]
    pub class_attribute: Option<String>,

    /// What to do when two images share a label file name
    #[arg(long = "on_collision", value_enum, default_value = "merge")]
    pub on_collision: CollisionPolicy,

    /// List of class names, in class id order
    #[arg(use_value_delimiter = true)]
    pub label_list: Vec<String>,
}

impl Args {
    /// Args for converting `via` into `dest` with every option at its default
    pub fn new(dest: impl Into<PathBuf>, via: Option<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            clear: false,
            test: false,
            via,
            train_split: DEFAULT_TRAIN_SPLIT,
            seed: None,
            class_attribute: None,
            on_collision: CollisionPolicy::Merge,
            label_list: Vec::new(),
        }
    }

    pub fn class_table(&self) -> ClassTable {
        ClassTable::new(self.label_list.clone(), self.class_attribute.clone())
    }

    pub fn test_limit(&self) -> Option<usize> {
        self.test.then_some(TEST_COUNT)
    }
}

// Handling of images whose label files share a name within one split
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CollisionPolicy {
    /// Concatenate the boxes of all colliding images into one label file
    Merge,
    /// Abort before writing anything
    Fail,
}

// Validate that the size is between 0.0 and 1.0
pub fn validate_size(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_size() {
        assert!(validate_size("0.5").is_ok());
        assert!(validate_size("1.0").is_ok());
        assert!(validate_size("0.0").is_ok());
        assert!(validate_size("-0.1").is_err());
        assert!(validate_size("1.1").is_err());
        assert!(validate_size("abc").is_err());
    }

    #[test]
    fn test_parse_command_line() {
        let args = Args::parse_from([
            "via2yolo",
            "out",
            "--clear",
            "--test",
            "--via",
            "data/via",
            "--seed",
            "7",
            "--on_collision",
            "fail",
        ]);
        assert_eq!(args.dest, PathBuf::from("out"));
        assert!(args.clear);
        assert_eq!(args.test_limit(), Some(TEST_COUNT));
        assert_eq!(args.via, Some(PathBuf::from("data/via")));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.train_split, DEFAULT_TRAIN_SPLIT);
        assert_eq!(args.on_collision, CollisionPolicy::Fail);
        assert_eq!(args.class_table().names(), &["object".to_string()]);
    }

    #[test]
    fn test_parse_label_list() {
        let args = Args::parse_from(["via2yolo", "out", "plate,car", "--class_attribute", "type"]);
        assert_eq!(args.label_list, vec!["plate".to_string(), "car".to_string()]);
        assert_eq!(args.class_table().attribute(), Some("type"));
        assert_eq!(args.on_collision, CollisionPolicy::Merge);
        assert!(args.via.is_none());
        assert!(args.test_limit().is_none());
    }

    #[test]
    fn test_rejects_out_of_range_split() {
        assert!(Args::try_parse_from(["via2yolo", "out", "--train_split", "1.5"]).is_err());
    }
}
