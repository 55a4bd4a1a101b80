//! OGC WMS client-side request building.
//!
//! Supports:
//! - WMS 1.1.1 and WMS 1.3.0 GetMap tile requests
//! - WMS 1.1.1 and WMS 1.3.0 GetFeatureInfo point queries
//! - A live tiled WMS source whose parameters can be patched in place

pub mod getfeatureinfo;
pub mod getmap;
pub mod request;
pub mod source;

pub use getfeatureinfo::InfoFormat;
pub use getmap::ServerType;
pub use source::{TileUrl, TileUrlFunction, TileWmsOptions, TileWmsSource};
