//! Common types shared by the WMS source crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod params;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::{AxisOrder, CrsCode};
pub use error::{WmsError, WmsResult};
pub use params::{ExtraParams, ParamValue, RequestParams, DEFAULT_WMS_VERSION};
pub use tile::{TileCoord, TileGrid};
