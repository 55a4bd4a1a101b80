//! Geographic (EPSG:4326) point transforms.

use thiserror::Error;
use wms_common::{CrsCode, WmsError};

use crate::mercator;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Coordinate is not finite: [{0}, {1}]")]
    NonFinite(f64, f64),

    #[error("Latitude out of range: {0}")]
    LatitudeOutOfRange(f64),
}

impl From<TransformError> for WmsError {
    fn from(err: TransformError) -> Self {
        WmsError::ProjectionError(err.to_string())
    }
}

/// Transform a `[lon, lat]` point in EPSG:4326 into `target`.
///
/// Geographic targets return the point unchanged. Longitudes are not
/// normalized; a longitude past ±180 projects past the extent edge.
pub fn point_from_lon_lat(coordinate: [f64; 2], target: CrsCode) -> Result<[f64; 2], TransformError> {
    let [lon, lat] = coordinate;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(TransformError::NonFinite(lon, lat));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(TransformError::LatitudeOutOfRange(lat));
    }

    match target {
        CrsCode::Epsg4326 | CrsCode::Epsg4269 => Ok([lon, lat]),
        CrsCode::Epsg3857 => {
            let (x, y) = mercator::forward(lon, lat);
            Ok([x, y])
        }
    }
}
