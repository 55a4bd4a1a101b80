//! Keeps a declarative set of WMS request parameters in sync with a live
//! tiled WMS source.
//!
//! The adapter takes the explicit `layers`/`version`/`styles` fields and a
//! free-form bag of extra parameters, merges them into one canonical
//! upper-case parameter set, creates the tile source from it once, and then
//! pushes each later change into the same source as a minimal patch.
//!
//! ```ignore
//! use wms_source::{TileSourceContext, WmsProps, WmsSourceAdapter};
//!
//! let context = TileSourceContext {
//!     url: Some("https://maps.example.org/geoserver/wms".to_string()),
//!     ..Default::default()
//! };
//! let mut adapter = WmsSourceAdapter::new(WmsProps::new("topp:states"), context)?;
//! adapter.mount()?;
//! adapter.on_styles_changed(Some("population".to_string()));
//! ```

pub mod adapter;
pub mod config;
pub mod context;
pub mod engine;
pub mod normalize;
pub mod props;

pub use adapter::WmsSourceAdapter;
pub use config::SourceConfig;
pub use context::{FixedView, MapView, TileSourceAdapter, TileSourceContext};
pub use engine::{TileWmsFactory, WmsSourceFactory, WmsSourceHandle};
pub use normalize::{effective_params, normalize_params};
pub use props::WmsProps;
