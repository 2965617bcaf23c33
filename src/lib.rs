//! VIA to YOLO format converter
//!
//! This library converts polygon annotations made with the VGG Image Annotator
//! (VIA) into a YOLO bounding-box dataset split into train and val sets.

pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod reader;
pub mod split;
pub mod types;
pub mod utils;
pub mod writer;

// Re-export commonly used types and functions
pub use config::{Args, CollisionPolicy};
pub use dataset::{process_dataset, run};
pub use error::{ConvertError, Result};
pub use geometry::{polygon_to_object, Rect};
pub use reader::read_via_dataset;
pub use split::split_items;
pub use types::{ClassTable, Item, Object, OutputDirs, ProcessingStats, Split, SplitData};
pub use writer::{create_dataset_yaml, setup_output_directories, write_dataset};
