//! Point transforms from geographic coordinates into map projections.
//!
//! Implements the projections a WMS source can request in without external
//! dependencies.

pub mod mercator;
pub mod transform;

pub use transform::{point_from_lon_lat, TransformError};
