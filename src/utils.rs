use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::ViaImageMetadata;

// Key of the image mapping inside a VIA project file
const VIA_IMG_METADATA: &str = "_via_img_metadata";

/// Read a VIA annotation file into `(image id, metadata)` pairs in file order.
///
/// Accepts both a full VIA project (`_via_img_metadata` holds the mapping)
/// and an exported annotation file (the mapping is the whole document).
pub fn read_via_json(path: &Path) -> Result<Vec<(String, ViaImageMetadata)>> {
    let file = fs::File::open(path).map_err(|e| ConvertError::io(path, e))?;
    let json_error = |source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    };

    let mut document: Map<String, Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(json_error)?;

    let mapping = match document.remove(VIA_IMG_METADATA) {
        Some(metadata) => serde_json::from_value::<Map<String, Value>>(metadata).map_err(json_error)?,
        None => {
            debug!(
                "{} has no {} key, reading it as an exported annotation mapping",
                path.display(),
                VIA_IMG_METADATA
            );
            document
        }
    };

    mapping
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value::<ViaImageMetadata>(value)
                .map(|metadata| (key, metadata))
                .map_err(json_error)
        })
        .collect()
}

/// Read width and height from the image header without decoding pixels
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32)> {
    let size = imagesize::size(path).map_err(|source| ConvertError::ImageDimensions {
        path: path.to_path_buf(),
        source,
    })?;

    checked_dimensions(path, size)
}

/// Dimensions as `u32`, rejecting empty and oversized images
fn checked_dimensions(path: &Path, size: imagesize::ImageSize) -> Result<(u32, u32)> {
    let (Ok(width), Ok(height)) = (u32::try_from(size.width), u32::try_from(size.height)) else {
        return Err(ConvertError::ImageTooLarge {
            path: path.to_path_buf(),
            width: size.width,
            height: size.height,
        });
    };

    if width == 0 || height == 0 {
        return Err(ConvertError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok((width, height))
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create a directory and its parents; existing directories are kept
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Recursively delete the output directory if it exists
pub fn remove_output_directory(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    warn!("Removing existing output directory {}", path.display());
    fs::remove_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("via_region_data.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_via_project_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            r#"{
                "_via_settings": {},
                "_via_img_metadata": {
                    "z.jpg1": { "filename": "z.jpg", "size": 1, "regions": [] },
                    "a.jpg2": { "filename": "a.jpg", "size": 2, "regions": [] },
                    "m.jpg3": { "filename": "m.jpg", "size": 3, "regions": [] }
                }
            }"#,
        );

        let entries = read_via_json(&path).unwrap();
        let names: Vec<_> = entries.iter().map(|(_, m)| m.filename.as_str()).collect();
        assert_eq!(names, vec!["z.jpg", "a.jpg", "m.jpg"]);
        assert_eq!(entries[0].0, "z.jpg1");
    }

    #[test]
    fn test_read_exported_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            r#"{ "b.png42": { "filename": "b.png", "regions": [] } }"#,
        );

        let entries = read_via_json(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.filename, "b.png");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "{ not json");
        assert!(matches!(read_via_json(&path), Err(ConvertError::Json { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(read_via_json(&missing), Err(ConvertError::Io { .. })));
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            read_image_dimensions(&path),
            Err(ConvertError::ImageDimensions { .. })
        ));
    }

    #[test]
    fn test_checked_dimensions() {
        let path = Path::new("image.png");
        let size = |width, height| imagesize::ImageSize { width, height };

        assert_eq!(checked_dimensions(path, size(640, 480)).unwrap(), (640, 480));
        assert!(matches!(
            checked_dimensions(path, size(0, 480)),
            Err(ConvertError::EmptyImage { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_dimensions_are_an_error() {
        let path = Path::new("huge.png");
        let size = imagesize::ImageSize {
            width: u32::MAX as usize + 1,
            height: 10,
        };
        assert!(matches!(
            checked_dimensions(path, size),
            Err(ConvertError::ImageTooLarge { width, height: 10, .. }) if width == u32::MAX as usize + 1
        ));
    }

    #[test]
    fn test_remove_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        assert!(!remove_output_directory(&out).unwrap());

        ensure_directory(&out.join("images/train")).unwrap();
        assert!(remove_output_directory(&out).unwrap());
        assert!(!out.exists());
    }
}
