use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::PolygonError;
use crate::types::Split;

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse VIA JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read image dimensions of {}: {source}", path.display())]
    ImageDimensions {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("image {} is {width}x{height}, larger than supported", path.display())]
    ImageTooLarge {
        path: PathBuf,
        width: usize,
        height: usize,
    },

    #[error("image {} has zero width or height", path.display())]
    EmptyImage { path: PathBuf },

    #[error("invalid polygon in {}: {source}", image.display())]
    InvalidPolygon {
        image: PathBuf,
        #[source]
        source: PolygonError,
    },

    #[error("image path {} has no usable file name", path.display())]
    InvalidImagePath { path: PathBuf },

    #[error("label file {label} in {split} split would receive boxes from more than one image")]
    LabelCollision { split: Split, label: String },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
