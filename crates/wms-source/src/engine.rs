//! Seam between the adapter and the tiling engine.

use wms_common::{CrsCode, RequestParams, TileCoord, WmsResult};
use wms_protocol::{TileWmsOptions, TileWmsSource};

/// A live tile source the adapter pushes parameter patches into.
pub trait WmsSourceHandle {
    /// Overlay `patch` onto the live parameters.
    fn update_params(&mut self, patch: RequestParams);

    fn feature_info_url(
        &self,
        coordinate: [f64; 2],
        resolution: f64,
        projection: CrsCode,
        params: RequestParams,
    ) -> Option<String>;

    fn tile_url(&self, tile_coord: TileCoord, pixel_ratio: f64, projection: CrsCode) -> Option<String>;

    fn params(&self) -> &RequestParams;

    fn key(&self) -> &str;
}

/// Creates live sources from options.
pub trait WmsSourceFactory {
    type Handle: WmsSourceHandle;

    fn create(&self, options: TileWmsOptions) -> WmsResult<Self::Handle>;
}

/// Factory for the built-in [`TileWmsSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TileWmsFactory;

impl WmsSourceFactory for TileWmsFactory {
    type Handle = TileWmsSource;

    fn create(&self, options: TileWmsOptions) -> WmsResult<TileWmsSource> {
        TileWmsSource::new(options)
    }
}

impl WmsSourceHandle for TileWmsSource {
    fn update_params(&mut self, patch: RequestParams) {
        TileWmsSource::update_params(self, patch)
    }

    fn feature_info_url(
        &self,
        coordinate: [f64; 2],
        resolution: f64,
        projection: CrsCode,
        params: RequestParams,
    ) -> Option<String> {
        TileWmsSource::feature_info_url(self, coordinate, resolution, projection, params)
    }

    fn tile_url(&self, tile_coord: TileCoord, pixel_ratio: f64, projection: CrsCode) -> Option<String> {
        TileWmsSource::tile_url(self, tile_coord, pixel_ratio, projection)
    }

    fn params(&self) -> &RequestParams {
        TileWmsSource::params(self)
    }

    fn key(&self) -> &str {
        TileWmsSource::key(self)
    }
}
