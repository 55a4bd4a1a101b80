//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::AxisOrder;

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Top-left corner as `(min_x, max_y)`.
    pub fn top_left(&self) -> (f64, f64) {
        (self.min_x, self.max_y)
    }

    /// Grow the box by `value` on every side.
    pub fn buffer(&self, value: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x - value,
            min_y: self.min_y - value,
            max_x: self.max_x + value,
            max_y: self.max_y + value,
        }
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Format as a WMS BBOX parameter value.
    ///
    /// `AxisOrder::LatLon` swaps each corner to `miny,minx,maxy,maxx`.
    pub fn to_wms_string(&self, axis_order: AxisOrder) -> String {
        match axis_order {
            AxisOrder::XY => format!(
                "{},{},{},{}",
                self.min_x, self.min_y, self.max_x, self.max_y
            ),
            AxisOrder::LatLon => format!(
                "{},{},{},{}",
                self.min_y, self.min_x, self.max_y, self.max_x
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).buffer(2.5);
        assert_eq!(bbox, BoundingBox::new(-2.5, -2.5, 12.5, 12.5));
    }

    #[test]
    fn test_wms_string_axis_order() {
        let bbox = BoundingBox::new(-125.0, 24.0, -66.5, 50.0);
        assert_eq!(bbox.to_wms_string(AxisOrder::XY), "-125,24,-66.5,50");
        assert_eq!(bbox.to_wms_string(AxisOrder::LatLon), "24,-125,50,-66.5");
    }
}
