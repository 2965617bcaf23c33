//! Reduction of polygon regions to normalized center-form boxes.

use thiserror::Error;

use crate::types::Object;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonError {
    #[error("polygon has no vertices")]
    Empty,
    #[error("polygon has {xs} x coordinates but {ys} y coordinates")]
    Mismatched { xs: usize, ys: usize },
}

/// Axis-aligned rectangle enclosing a set of points, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Enclosing rectangle of the vertices given as parallel coordinate lists.
    pub fn enclosing(xs: &[f64], ys: &[f64]) -> Result<Self, PolygonError> {
        if xs.len() != ys.len() {
            return Err(PolygonError::Mismatched {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(PolygonError::Empty);
        }

        let (min_x, min_y, max_x, max_y) = xs.iter().zip(ys).fold(
            (
                f64::INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
            ),
            |(min_x, min_y, max_x, max_y), (&x, &y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        );

        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Normalize by the image size and convert to center form.
    ///
    /// Degenerate or out-of-frame rectangles are passed through unchanged, so
    /// the result may have zero size or leave `[0, 1]`.
    pub fn to_object(&self, cls: usize, image_width: u32, image_height: u32) -> Object {
        let width = image_width as f64;
        let height = image_height as f64;

        let left = self.min_x / width;
        let top = self.min_y / height;
        let w = self.max_x / width - left;
        let h = self.max_y / height - top;

        Object {
            cls,
            x: left + w / 2.0,
            y: top + h / 2.0,
            w,
            h,
        }
    }
}

/// Box of a VIA polygon given by its `all_points_x` and `all_points_y` lists
pub fn polygon_to_object(
    cls: usize,
    xs: &[f64],
    ys: &[f64],
    image_width: u32,
    image_height: u32,
) -> Result<Object, PolygonError> {
    Ok(Rect::enclosing(xs, ys)?.to_object(cls, image_width, image_height))
}
