use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

// Subsets of a VIA source root, read in this order
pub const VIA_SUBSETS: &[&str] = &["train", "val"];

// Class name used when no label list is given
pub const DEFAULT_CLASS_NAME: &str = "object";

// Shape name of the only VIA region kind that produces boxes
pub const POLYGON_SHAPE: &str = "polygon";

// The per-image entry of a VIA project file
#[derive(Debug, Deserialize, Clone)]
pub struct ViaImageMetadata {
    pub filename: String,
    #[serde(default, deserialize_with = "deserialize_regions")]
    pub regions: Vec<ViaRegion>,
}

// A single annotated region
#[derive(Debug, Deserialize, Clone)]
pub struct ViaRegion {
    pub shape_attributes: ShapeAttributes,
    #[serde(default)]
    pub region_attributes: Map<String, Value>,
}

// Geometry of a region; only the polygon vertex lists are retained
#[derive(Debug, Deserialize, Clone)]
pub struct ShapeAttributes {
    pub name: String,
    #[serde(default)]
    pub all_points_x: Vec<f64>,
    #[serde(default)]
    pub all_points_y: Vec<f64>,
}

impl ShapeAttributes {
    pub fn is_polygon(&self) -> bool {
        self.name == POLYGON_SHAPE
    }
}

/// VIA 2 stores regions as a list, VIA 1 as an object keyed by index.
fn deserialize_regions<'de, D>(deserializer: D) -> Result<Vec<ViaRegion>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Regions {
        List(Vec<ViaRegion>),
        Keyed(Map<String, Value>),
    }

    match Regions::deserialize(deserializer)? {
        Regions::List(regions) => Ok(regions),
        Regions::Keyed(map) => map
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(de::Error::custom))
            .collect(),
    }
}

/// A polygon region reduced to a normalized center-form box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Object {
    pub cls: usize,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Object {
    /// Format as a YOLO label line (without the trailing newline)
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.5} {:.5} {:.5} {:.5}",
            self.cls, self.x, self.y, self.w, self.h
        )
    }
}

/// One source image and the boxes read for it, in region order.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub image: PathBuf,
    pub objects: Vec<Object>,
}

impl Item {
    pub fn new(image: PathBuf) -> Self {
        Self {
            image,
            objects: Vec::new(),
        }
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.image.file_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered class names; a class id is an index into the table.
#[derive(Debug, Clone)]
pub struct ClassTable {
    names: Vec<String>,
    attribute: Option<String>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl ClassTable {
    /// An empty name list yields the single default class.
    pub fn new(names: Vec<String>, attribute: Option<String>) -> Self {
        let names = if names.is_empty() {
            vec![DEFAULT_CLASS_NAME.to_string()]
        } else {
            names
        };
        Self { names, attribute }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Class id for a region, or `None` when its class is missing or unknown.
    ///
    /// Without a class attribute every region belongs to class 0. With one,
    /// the region attribute may be a plain string (text or radio attributes)
    /// or an object of booleans (checkbox attributes), in which case the first
    /// checked option is used.
    pub fn resolve(&self, region: &ViaRegion) -> Option<usize> {
        let Some(attribute) = &self.attribute else {
            return Some(0);
        };

        let label = match region.region_attributes.get(attribute)? {
            Value::String(label) => label.as_str(),
            Value::Object(options) => options
                .iter()
                .find(|(_, checked)| checked.as_bool() == Some(true))
                .map(|(label, _)| label.as_str())?,
            _ => return None,
        };

        self.names.iter().position(|name| name == label)
    }
}

// Struct to hold the paths to the output directories for train/val splits
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

impl OutputDirs {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            train_labels_dir: root.join("labels").join(Split::Train.as_str()),
            val_labels_dir: root.join("labels").join(Split::Val.as_str()),
            train_images_dir: root.join("images").join(Split::Train.as_str()),
            val_images_dir: root.join("images").join(Split::Val.as_str()),
        }
    }

    pub fn images_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train_images_dir,
            Split::Val => &self.val_images_dir,
        }
    }

    pub fn labels_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train_labels_dir,
            Split::Val => &self.val_labels_dir,
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.train_images_dir,
            &self.val_images_dir,
            &self.train_labels_dir,
            &self.val_labels_dir,
        ]
    }
}

// Struct to hold the shuffled items assigned to each split
#[derive(Debug, Default)]
pub struct SplitData {
    pub train_items: Vec<Item>,
    pub val_items: Vec<Item>,
}

impl SplitData {
    pub fn iter(&self) -> impl Iterator<Item = (Split, &Item)> {
        self.train_items
            .iter()
            .map(|item| (Split::Train, item))
            .chain(self.val_items.iter().map(|item| (Split::Val, item)))
    }

    pub fn len(&self) -> usize {
        self.train_items.len() + self.val_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub images_read: usize,
    pub objects_read: usize,
    pub skipped_shapes: usize,
    pub skipped_unknown_class: usize,
    pub train_images: usize,
    pub val_images: usize,
    pub label_collisions: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Images read: {}", self.images_read);
        log::info!("Boxes read: {}", self.objects_read);
        log::info!(
            "Written: {} train, {} val",
            self.train_images,
            self.val_images
        );

        if self.skipped_shapes > 0 {
            log::warn!("Skipped non-polygon regions: {}", self.skipped_shapes);
        }
        if self.skipped_unknown_class > 0 {
            log::warn!(
                "Skipped regions with missing or unknown class: {}",
                self.skipped_unknown_class
            );
        }
        if self.label_collisions > 0 {
            log::warn!(
                "Label files shared by more than one image: {}",
                self.label_collisions
            );
        }
    }
}
