//! Spherical Web Mercator (EPSG:3857).
//!
//! Uses the WGS84 semi-major axis as sphere radius. Latitudes beyond the
//! square-world limit are clamped so poles map to the edge of the extent
//! instead of infinity.

use std::f64::consts::PI;

/// Sphere radius (meters)
pub const RADIUS: f64 = 6378137.0;

/// Latitude at which the projected world becomes square (degrees).
pub const MAX_LATITUDE: f64 = 85.0511287798066;

/// Project longitude/latitude (degrees) to Web Mercator meters.
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = RADIUS * lon.to_radians();
    let y = RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();

    (x, y)
}

/// Web Mercator meters back to longitude/latitude (degrees).
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / RADIUS).to_degrees();
    let lat = (2.0 * (y / RADIUS).exp().atan() - PI / 2.0).to_degrees();

    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_coords_approx_eq;
    use wms_common::crs::WEB_MERCATOR_HALF_SIZE;

    #[test]
    fn test_origin() {
        let (x, y) = forward(0.0, 0.0);
        assert_coords_approx_eq!((x, y), (0.0, 0.0), 1e-9);
    }

    #[test]
    fn test_antimeridian_is_extent_edge() {
        let (x, _) = forward(180.0, 0.0);
        test_utils::assert_approx_eq!(x, WEB_MERCATOR_HALF_SIZE, 1e-6);
    }

    #[test]
    fn test_pole_is_clamped() {
        let (_, y) = forward(0.0, 90.0);
        test_utils::assert_approx_eq!(y, WEB_MERCATOR_HALF_SIZE, 1e-3);
    }

    #[test]
    fn test_known_city() {
        // Kansas City, MO
        let (x, y) = forward(-94.5786, 39.0997);
        test_utils::assert_approx_eq!(x, -10528441.59, 0.01);
        test_utils::assert_approx_eq!(y, 4735962.82, 0.01);

        let (lon, lat) = inverse(x, y);
        assert_coords_approx_eq!((lon, lat), (-94.5786, 39.0997), 1e-9);
    }
}
