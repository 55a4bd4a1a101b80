//! Common test fixtures for wms-source tests.
//!
//! This module provides pre-defined data for the scenarios the WMS source
//! tests keep coming back to.

/// Well-known points as `[lon, lat]` in EPSG:4326.
pub mod points {
    /// Null Island
    pub const ORIGIN: [f64; 2] = [0.0, 0.0];

    /// Kansas City, MO
    pub const KANSAS_CITY: [f64; 2] = [-94.5786, 39.0997];

    /// Rome, Italy
    pub const ROME: [f64; 2] = [12.4964, 41.9028];

    /// Just inside the Web Mercator latitude limit
    pub const NEAR_NORTH_LIMIT: [f64; 2] = [10.0, 85.0];
}

/// WMS endpoint URLs.
pub mod urls {
    /// A GeoServer style endpoint
    pub const GEOSERVER: &str = "https://maps.example.org/geoserver/wms";

    /// A MapServer style endpoint that already carries a query string
    pub const MAPSERVER: &str = "https://maps.example.org/cgi-bin/mapserv?map=/data/world.map";

    /// An endpoint template with `{token}` placeholders
    pub const TEMPLATE: &str = "https://{host}/geoserver/{workspace}/wms";
}

/// Layer names used throughout the tests.
pub mod layers {
    pub const TOPP_STATES: &str = "topp:states";
    pub const NE_COUNTRIES: &str = "ne:countries";
}

/// Resolutions (map units per pixel) of a Web Mercator view.
pub mod resolutions {
    /// Zoom 0 of the default Web Mercator grid
    pub const WEB_MERCATOR_Z0: f64 = 156543.03392804097;

    /// Zoom 4 of the default Web Mercator grid
    pub const WEB_MERCATOR_Z4: f64 = 9783.93962050256;
}
