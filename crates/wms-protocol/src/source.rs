//! A tiled WMS source with live, patchable request parameters.
//!
//! The source owns the parameter set every tile and feature-info request is
//! built from. Patching parameters changes the source key, so tiles cached
//! under the old key are refetched while everything else is kept.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use wms_common::params::LAYERS;
use wms_common::{
    BoundingBox, CrsCode, ParamValue, RequestParams, TileCoord, TileGrid, WmsError, WmsResult,
};

use crate::getfeatureinfo::{feature_info_pixel, has_info_format, insert_pixel};
use crate::getmap::{scale_size, ServerType, TileRequest};
use crate::request::{base_params, is_v13, validate_version};

/// Callback producing a tile URL from tile coordinate, pixel ratio and projection.
pub type TileUrlFunction = Arc<dyn Fn(TileCoord, f64, CrsCode) -> Option<String> + Send + Sync>;

/// Where tile requests are sent.
#[derive(Clone)]
pub enum TileUrl {
    /// A single WMS endpoint.
    Single(String),
    /// Several equivalent endpoints; tiles are spread across them.
    Multiple(Vec<String>),
    /// A caller-supplied URL function replacing the WMS URL rules for tiles.
    Function(TileUrlFunction),
}

impl fmt::Debug for TileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileUrl::Single(url) => f.debug_tuple("Single").field(url).finish(),
            TileUrl::Multiple(urls) => f.debug_tuple("Multiple").field(urls).finish(),
            TileUrl::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Construction options for [`TileWmsSource`].
#[derive(Debug, Clone)]
pub struct TileWmsOptions {
    pub attributions: Vec<String>,
    /// Number of tiles the tile cache may hold.
    pub cache_size: usize,
    /// Initial request parameters. LAYERS is required.
    pub params: RequestParams,
    pub cross_origin: Option<String>,
    /// Extra pixels requested around every tile, cropped off when rendering.
    pub gutter: u32,
    /// Request high-DPI images when the pixel ratio is above 1.
    pub hidpi: bool,
    pub logo: Option<String>,
    pub tile_grid: Option<TileGrid>,
    pub projection: CrsCode,
    pub reprojection_error_threshold: f64,
    /// Server implementation, needed for high-DPI requests.
    pub server_type: Option<String>,
    pub wrap_x: bool,
    pub url: Option<TileUrl>,
}

impl Default for TileWmsOptions {
    fn default() -> Self {
        Self {
            attributions: Vec::new(),
            cache_size: 2048,
            params: RequestParams::new(),
            cross_origin: None,
            gutter: 0,
            hidpi: true,
            logo: None,
            tile_grid: None,
            projection: CrsCode::Epsg3857,
            reprojection_error_threshold: 0.5,
            server_type: None,
            wrap_x: true,
            url: None,
        }
    }
}

/// A live tiled WMS source.
#[derive(Debug, Clone)]
pub struct TileWmsSource {
    options: TileWmsOptions,
    server_type: Option<ServerType>,
    default_grid: TileGrid,
    key: String,
    revision: u64,
}

impl TileWmsSource {
    /// Create a source, rejecting options no request could be built from.
    pub fn new(options: TileWmsOptions) -> WmsResult<Self> {
        match options.params.get(LAYERS) {
            Some(value) if !value.is_null() && !value.to_string().is_empty() => {}
            _ => return Err(WmsError::MissingParameter(LAYERS.to_string())),
        }
        if let Some(version) = options.params.get("VERSION").filter(|v| !v.is_null()) {
            validate_version(version)?;
        }

        let server_type = options
            .server_type
            .as_deref()
            .map(str::parse::<ServerType>)
            .transpose()?;

        if let Some(grid) = &options.tile_grid {
            grid.validate()?;
        }
        if !options.reprojection_error_threshold.is_finite()
            || options.reprojection_error_threshold <= 0.0
        {
            return Err(WmsError::InvalidParameter {
                param: "reprojectionErrorThreshold".to_string(),
                message: format!("must be positive, got {}", options.reprojection_error_threshold),
            });
        }

        let default_grid = TileGrid::for_projection(options.projection);
        let key = params_key(&options.params);

        debug!(
            key = %key,
            projection = %options.projection,
            url = ?options.url,
            "Created tiled WMS source"
        );

        Ok(Self {
            options,
            server_type,
            default_grid,
            key,
            revision: 0,
        })
    }

    /// Current request parameters.
    pub fn params(&self) -> &RequestParams {
        &self.options.params
    }

    /// Merge `patch` into the current parameters.
    ///
    /// Keys in the patch override existing ones; keys not in the patch are
    /// kept. The source key and revision change only when the merged
    /// parameters differ from the previous ones.
    pub fn update_params(&mut self, patch: RequestParams) {
        self.options.params.extend(patch);

        let key = params_key(&self.options.params);
        if key != self.key {
            self.revision += 1;
            debug!(old_key = %self.key, new_key = %key, revision = self.revision, "WMS source params updated");
            self.key = key;
        }
    }

    /// Cache key derived from the current parameters.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of effective parameter updates since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn options(&self) -> &TileWmsOptions {
        &self.options
    }

    pub fn server_type(&self) -> Option<ServerType> {
        self.server_type
    }

    /// Endpoint URLs, empty when the source uses a URL function or has no URL.
    pub fn urls(&self) -> &[String] {
        match &self.options.url {
            Some(TileUrl::Single(url)) => std::slice::from_ref(url),
            Some(TileUrl::Multiple(urls)) => urls,
            _ => &[],
        }
    }

    /// The configured grid, or the default grid for `projection`.
    pub fn tile_grid_for_projection(&self, projection: CrsCode) -> Cow<'_, TileGrid> {
        match &self.options.tile_grid {
            Some(grid) => Cow::Borrowed(grid),
            None if projection == self.options.projection => Cow::Borrowed(&self.default_grid),
            None => Cow::Owned(TileGrid::for_projection(projection)),
        }
    }

    /// GetMap URL for one tile.
    ///
    /// Returns `None` for tiles outside the grid or when no URL is configured.
    pub fn tile_url(&self, tile_coord: TileCoord, pixel_ratio: f64, projection: CrsCode) -> Option<String> {
        let grid = self.tile_grid_for_projection(projection);
        let tile_coord = if self.options.wrap_x {
            grid.wrap_x(tile_coord)
        } else {
            tile_coord
        };
        if !grid.contains_tile(&tile_coord) {
            return None;
        }

        if let Some(TileUrl::Function(function)) = &self.options.url {
            return function(tile_coord, pixel_ratio, projection);
        }

        let pixel_ratio = if self.options.hidpi && self.server_type.is_some() {
            pixel_ratio
        } else {
            1.0
        };

        let resolution = grid.resolution(tile_coord.z)?;
        let (size, extent) = self.padded_tile(&grid, &tile_coord, resolution)?;
        let size = if pixel_ratio != 1.0 {
            scale_size(size, pixel_ratio)
        } else {
            size
        };

        let mut params = base_params("GetMap");
        params.extend(self.options.params.clone());

        TileRequest {
            urls: self.urls(),
            tile_coord,
            size,
            extent,
            pixel_ratio,
            projection,
            server_type: self.server_type,
        }
        .url(params)
    }

    /// GetFeatureInfo URL for a coordinate given in `projection`.
    ///
    /// The request is built on the tile grid of `projection` and names it as
    /// CRS/SRS. QUERY_LAYERS defaults to the source's LAYERS; `params`
    /// override the source parameters. Returns `None` when no URL is
    /// configured, when INFO_FORMAT is missing, or when the coordinate falls
    /// outside the tile grid.
    pub fn feature_info_url(
        &self,
        coordinate: [f64; 2],
        resolution: f64,
        projection: CrsCode,
        params: RequestParams,
    ) -> Option<String> {
        if self.urls().is_empty() {
            debug!("No WMS endpoint configured, cannot build GetFeatureInfo URL");
            return None;
        }

        let grid = self.tile_grid_for_projection(projection);
        let tile_coord =
            grid.tile_coord_for_coord_and_resolution(coordinate[0], coordinate[1], resolution)?;
        let tile_resolution = grid.resolution(tile_coord.z)?;
        let (size, extent) = self.padded_tile(&grid, &tile_coord, tile_resolution)?;

        let mut request = base_params("GetFeatureInfo");
        request.insert(
            "QUERY_LAYERS".to_string(),
            self.options.params.get(LAYERS).cloned().unwrap_or(ParamValue::Null),
        );
        request.extend(self.options.params.clone());
        request.extend(params);

        if !has_info_format(&request) {
            debug!("GetFeatureInfo request has no INFO_FORMAT");
            return None;
        }

        let pixel = feature_info_pixel(coordinate, &extent, tile_resolution);
        let v13 = is_v13(&request);
        insert_pixel(&mut request, pixel, v13);

        TileRequest {
            urls: self.urls(),
            tile_coord,
            size,
            extent,
            pixel_ratio: 1.0,
            projection,
            server_type: self.server_type,
        }
        .url(request)
    }

    /// Tile size and extent grown by the gutter.
    fn padded_tile(
        &self,
        grid: &TileGrid,
        tile_coord: &TileCoord,
        resolution: f64,
    ) -> Option<((u32, u32), BoundingBox)> {
        let extent = grid.tile_extent(tile_coord)?;
        let gutter = self.options.gutter;
        let size = grid.tile_size + 2 * gutter;

        if gutter == 0 {
            return Some(((size, size), extent));
        }
        Some(((size, size), extent.buffer(resolution * gutter as f64)))
    }
}

/// `KEY-value` pairs of all non-null parameters, joined by `/`.
fn params_key(params: &RequestParams) -> String {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| format!("{}-{}", key, value))
        .collect::<Vec<_>>()
        .join("/")
}
