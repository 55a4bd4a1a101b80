//! Tile coordinates and tile grids.
//!
//! Tile rows count downwards from the grid origin (top-left corner), matching
//! XYZ/WMTS addressing.

use crate::{BoundingBox, CrsCode, WmsError, WmsResult};
use serde::{Deserialize, Serialize};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Highest zoom level of a default grid. 2^31 columns still fit a `u32` index.
pub const DEFAULT_MAX_ZOOM: u32 = 31;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Stable hash used to spread requests over several server URLs.
    pub fn hash(&self) -> u64 {
        ((self.x as u64) << self.z.min(32)).wrapping_add(self.y as u64)
    }
}

/// A tile grid: an origin, one resolution per zoom level and a tile size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Top-left corner of tile (0, 0) at every zoom level.
    pub origin: (f64, f64),

    /// Map units per pixel, one entry per zoom level, strictly decreasing.
    pub resolutions: Vec<f64>,

    /// Tile edge length in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Area covered by the grid. Coordinates outside it have no tile.
    #[serde(default)]
    pub extent: Option<BoundingBox>,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

impl TileGrid {
    /// Build a grid, checking the resolutions are usable.
    pub fn new(
        origin: (f64, f64),
        resolutions: Vec<f64>,
        tile_size: u32,
        extent: Option<BoundingBox>,
    ) -> WmsResult<Self> {
        let grid = Self {
            origin,
            resolutions,
            tile_size,
            extent,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Default grid covering the whole extent of a CRS.
    ///
    /// Zoom 0 fits the extent into a single tile; each further level halves
    /// the resolution.
    pub fn for_projection(crs: CrsCode) -> Self {
        Self::for_extent(crs.extent(), DEFAULT_MAX_ZOOM, DEFAULT_TILE_SIZE)
    }

    /// Default grid for an arbitrary extent.
    pub fn for_extent(extent: BoundingBox, max_zoom: u32, tile_size: u32) -> Self {
        let max_resolution = (extent.width() / tile_size as f64).max(extent.height() / tile_size as f64);
        let resolutions = (0..=max_zoom)
            .map(|z| max_resolution / 2f64.powi(z as i32))
            .collect();

        Self {
            origin: extent.top_left(),
            resolutions,
            tile_size,
            extent: Some(extent),
        }
    }

    /// Check the grid can address tiles.
    pub fn validate(&self) -> WmsResult<()> {
        if self.tile_size == 0 {
            return Err(WmsError::InvalidTileGrid("tile size must be positive".to_string()));
        }
        if self.resolutions.is_empty() {
            return Err(WmsError::InvalidTileGrid("no resolutions".to_string()));
        }
        if self.resolutions.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(WmsError::InvalidTileGrid(
                "resolutions must be positive".to_string(),
            ));
        }
        if self.resolutions.windows(2).any(|w| w[1] >= w[0]) {
            return Err(WmsError::InvalidTileGrid(
                "resolutions must be strictly decreasing".to_string(),
            ));
        }
        Ok(())
    }

    /// Highest zoom level of this grid.
    pub fn max_zoom(&self) -> u32 {
        self.resolutions.len().saturating_sub(1) as u32
    }

    /// Resolution at a zoom level.
    pub fn resolution(&self, z: u32) -> Option<f64> {
        self.resolutions.get(z as usize).copied()
    }

    /// Zoom level whose resolution is nearest to `resolution`.
    pub fn z_for_resolution(&self, resolution: f64) -> u32 {
        let resolutions = &self.resolutions;
        let last = resolutions.len().saturating_sub(1);

        if resolutions.is_empty() || resolutions[0] <= resolution {
            return 0;
        }
        if resolution <= resolutions[last] {
            return last as u32;
        }

        for i in 1..resolutions.len() {
            if resolutions[i] == resolution {
                return i as u32;
            }
            if resolutions[i] < resolution {
                // Between levels i-1 and i: pick the closer one
                return if resolutions[i - 1] - resolution < resolution - resolutions[i] {
                    (i - 1) as u32
                } else {
                    i as u32
                };
            }
        }
        last as u32
    }

    /// Number of tile columns at a zoom level, when the grid has an extent.
    pub fn matrix_width(&self, z: u32) -> Option<u32> {
        let extent = self.extent?;
        let span = self.resolution(z)? * self.tile_size as f64;
        Some(((extent.max_x - self.origin.0) / span).ceil().max(1.0) as u32)
    }

    /// Number of tile rows at a zoom level, when the grid has an extent.
    pub fn matrix_height(&self, z: u32) -> Option<u32> {
        let extent = self.extent?;
        let span = self.resolution(z)? * self.tile_size as f64;
        Some(((self.origin.1 - extent.min_y) / span).ceil().max(1.0) as u32)
    }

    /// Get the bounding box for a specific tile.
    pub fn tile_extent(&self, coord: &TileCoord) -> Option<BoundingBox> {
        let res = self.resolution(coord.z)?;
        let tile_span = res * self.tile_size as f64;

        let min_x = self.origin.0 + coord.x as f64 * tile_span;
        let max_y = self.origin.1 - coord.y as f64 * tile_span;
        let max_x = min_x + tile_span;
        let min_y = max_y - tile_span;

        Some(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Find which tile contains a coordinate at the zoom level nearest to `resolution`.
    ///
    /// Tiles own their left and top edges, so a point on the right or bottom
    /// edge of the grid extent has no tile. Columns and rows past `u32::MAX`
    /// have no tile either.
    pub fn tile_coord_for_coord_and_resolution(
        &self,
        x: f64,
        y: f64,
        resolution: f64,
    ) -> Option<TileCoord> {
        if let Some(extent) = &self.extent {
            if !extent.contains_point(x, y) {
                return None;
            }
        }

        let z = self.z_for_resolution(resolution);
        let res = self.resolution(z)?;
        let tile_span = res * self.tile_size as f64;

        let col = ((x - self.origin.0) / tile_span).floor();
        let row = ((self.origin.1 - y) / tile_span).floor();

        if col < 0.0 || row < 0.0 || col > u32::MAX as f64 || row > u32::MAX as f64 {
            return None;
        }
        if let (Some(width), Some(height)) = (self.matrix_width(z), self.matrix_height(z)) {
            if col >= width as f64 || row >= height as f64 {
                return None;
            }
        }

        Some(TileCoord::new(z, col as u32, row as u32))
    }

    /// Check a tile exists in this grid and overlaps its extent.
    pub fn contains_tile(&self, coord: &TileCoord) -> bool {
        let Some(tile_extent) = self.tile_extent(coord) else {
            return false;
        };
        match &self.extent {
            Some(extent) => {
                tile_extent.min_x < extent.max_x
                    && tile_extent.max_x > extent.min_x
                    && tile_extent.min_y < extent.max_y
                    && tile_extent.max_y > extent.min_y
            }
            None => true,
        }
    }

    /// Wrap a column index back into the grid, for sources that repeat horizontally.
    pub fn wrap_x(&self, coord: TileCoord) -> TileCoord {
        match self.matrix_width(coord.z) {
            Some(width) if coord.x >= width => TileCoord::new(coord.z, coord.x % width, coord.y),
            _ => coord,
        }
    }
}
