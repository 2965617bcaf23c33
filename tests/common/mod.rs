#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a blank PNG of the given size
pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(path).unwrap();
}

pub fn polygon(xs: &[f64], ys: &[f64]) -> Value {
    json!({
        "shape_attributes": { "name": "polygon", "all_points_x": xs, "all_points_y": ys },
        "region_attributes": {}
    })
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Value {
    json!({
        "shape_attributes": { "name": "rect", "x": x, "y": y, "width": width, "height": height },
        "region_attributes": {}
    })
}

/// A VIA subset under construction: images plus their regions
pub struct Subset {
    dir: PathBuf,
    metadata: serde_json::Map<String, Value>,
}

impl Subset {
    pub fn new(root: &Path, name: &str) -> Self {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        Self {
            dir,
            metadata: serde_json::Map::new(),
        }
    }

    /// Add an image of the given size with the given regions
    pub fn image(self, filename: &str, size: (u32, u32), regions: Vec<Value>) -> Self {
        write_png(&self.dir.join(filename), size.0, size.1);
        self.entry(filename, regions)
    }

    /// Add a metadata entry without creating the image file
    pub fn entry(mut self, filename: &str, regions: Vec<Value>) -> Self {
        let key = format!("{}{}", filename, self.metadata.len());
        self.metadata.insert(
            key,
            json!({ "filename": filename, "size": -1, "regions": regions, "file_attributes": {} }),
        );
        self
    }

    /// Write via_region_data.json as a VIA project file
    pub fn finish(self) {
        let project = json!({
            "_via_settings": { "ui": {} },
            "_via_img_metadata": Value::Object(self.metadata),
            "_via_attributes": { "region": {}, "file": {} }
        });
        fs::write(
            self.dir.join("via_region_data.json"),
            serde_json::to_string_pretty(&project).unwrap(),
        )
        .unwrap();
    }
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Parse a label line into class id and box values
pub fn parse_line(line: &str) -> (usize, [f64; 4]) {
    let fields: Vec<&str> = line.split(' ').collect();
    assert_eq!(fields.len(), 5, "unexpected label line {:?}", line);
    let values: Vec<f64> = fields[1..].iter().map(|v| v.parse().unwrap()).collect();
    (fields[0].parse().unwrap(), [values[0], values[1], values[2], values[3]])
}
