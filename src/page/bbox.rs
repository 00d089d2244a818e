//! Region bounding boxes on the 0–1000 normalized page scale.

use serde::{Deserialize, Serialize};

/// Upper bound of the normalized coordinate scale used by analysis results.
pub const NORMALIZED_SCALE: f64 = 1000.0;

/// An axis-aligned text region box in `box_2d` order (ymin, xmin, ymax, xmax).
///
/// Coordinates are on a fixed 0–1000 scale independent of the page's pixel
/// dimensions. [`RegionBox::from_box_2d`] swaps reversed corners so that
/// `ymin <= ymax` and `xmin <= xmax` hold for every box built from analysis
/// output.
#[derive(Clone, Copy, PartialEq)]
pub struct RegionBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl RegionBox {
    /// Creates a box from explicit coordinates, as given.
    #[inline]
    pub fn new(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    /// Creates a box from an analysis `box_2d` tuple, ordering each axis.
    pub fn from_box_2d(box_2d: [f64; 4]) -> Self {
        let [y0, x0, y1, x1] = box_2d;
        Self::new(y0.min(y1), x0.min(x1), y0.max(y1), x0.max(x1))
    }

    /// Returns the box as a `[ymin, xmin, ymax, xmax]` tuple.
    #[inline]
    pub fn to_box_2d(&self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        (self.ymin + self.ymax) / 2.0
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.xmin + self.xmax) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.ymin.is_finite()
            && self.xmin.is_finite()
            && self.ymax.is_finite()
            && self.xmax.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max for both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.ymin <= self.ymax && self.xmin <= self.xmax
    }

    /// Projects the box onto a page of the given pixel size.
    ///
    /// Returns `(left, top, width, height)` in pixels, which is what an
    /// overlay needs to position a highlight over the page image.
    pub fn to_pixel_rect(&self, page_width: u32, page_height: u32) -> (f64, f64, f64, f64) {
        let sx = page_width as f64 / NORMALIZED_SCALE;
        let sy = page_height as f64 / NORMALIZED_SCALE;
        (
            self.xmin * sx,
            self.ymin * sy,
            self.width() * sx,
            self.height() * sy,
        )
    }
}

impl std::fmt::Debug for RegionBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionBox")
            .field("ymin", &self.ymin)
            .field("xmin", &self.xmin)
            .field("ymax", &self.ymax)
            .field("xmax", &self.xmax)
            .finish()
    }
}

impl Default for RegionBox {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// Serialized as the bare `box_2d` tuple so region lists read like analysis output.
impl Serialize for RegionBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_box_2d().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegionBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [ymin, xmin, ymax, xmax] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(RegionBox::new(ymin, xmin, ymax, xmax))
    }
}
