//! WMS GetMap request URLs for map tiles.
//!
//! Tile requests carry the tile's extent as BBOX and its pixel size as
//! WIDTH/HEIGHT. The same URL assembly is reused for GetFeatureInfo, which
//! queries a pixel inside one of these tiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use wms_common::{
    AxisOrder, BoundingBox, CrsCode, ParamValue, RequestParams, TileCoord, WmsError,
};

use crate::request::{append_params, is_v13};

/// Screen DPI the WMS servers assume for a pixel ratio of 1.
const BASE_DPI: f64 = 90.0;

/// WMS server implementations with a vendor parameter for high-DPI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    GeoServer,
    MapServer,
    CarmentaServer,
    Qgis,
}

impl ServerType {
    /// Add the vendor DPI parameter for `pixel_ratio`.
    pub fn apply_pixel_ratio(&self, params: &mut RequestParams, pixel_ratio: f64) {
        match self {
            ServerType::GeoServer => {
                let dpi = (BASE_DPI * pixel_ratio + 0.5).floor() as i64;
                let value = match params.get("FORMAT_OPTIONS").filter(|v| !v.is_null()) {
                    Some(existing) => format!("{};dpi:{}", existing, dpi),
                    None => format!("dpi:{}", dpi),
                };
                params.insert("FORMAT_OPTIONS".to_string(), ParamValue::from(value));
            }
            ServerType::MapServer => {
                params.insert(
                    "MAP_RESOLUTION".to_string(),
                    ParamValue::from(BASE_DPI * pixel_ratio),
                );
            }
            ServerType::CarmentaServer | ServerType::Qgis => {
                params.insert("DPI".to_string(), ParamValue::from(BASE_DPI * pixel_ratio));
            }
        }
    }
}

impl FromStr for ServerType {
    type Err = WmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geoserver" => Ok(ServerType::GeoServer),
            "mapserver" => Ok(ServerType::MapServer),
            "carmentaserver" => Ok(ServerType::CarmentaServer),
            "qgis" => Ok(ServerType::Qgis),
            _ => Err(WmsError::UnsupportedServerType(s.to_string())),
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerType::GeoServer => "geoserver",
            ServerType::MapServer => "mapserver",
            ServerType::CarmentaServer => "carmentaserver",
            ServerType::Qgis => "qgis",
        };
        f.write_str(name)
    }
}

/// Everything needed to turn merged parameters into a request URL for one tile.
#[derive(Debug, Clone)]
pub struct TileRequest<'a> {
    /// Candidate endpoint URLs; one is picked per tile.
    pub urls: &'a [String],
    pub tile_coord: TileCoord,
    /// Image size in pixels (width, height), gutter and pixel ratio included.
    pub size: (u32, u32),
    /// Requested extent, gutter included.
    pub extent: BoundingBox,
    pub pixel_ratio: f64,
    pub projection: CrsCode,
    pub server_type: Option<ServerType>,
}

impl TileRequest<'_> {
    /// Finish `params` with size, CRS, STYLES, DPI and BBOX and encode them onto an endpoint.
    ///
    /// Returns `None` when there is no endpoint to send the request to.
    pub fn url(&self, mut params: RequestParams) -> Option<String> {
        let url = pick_url(self.urls, &self.tile_coord)?;

        params.insert("WIDTH".to_string(), ParamValue::from(self.size.0));
        params.insert("HEIGHT".to_string(), ParamValue::from(self.size.1));

        let v13 = is_v13(&params);
        let crs_key = if v13 { "CRS" } else { "SRS" };
        params.insert(crs_key.to_string(), ParamValue::from(self.projection.to_string()));

        if params.get("STYLES").map_or(true, ParamValue::is_null) {
            params.insert("STYLES".to_string(), ParamValue::from(""));
        }

        if self.pixel_ratio != 1.0 {
            if let Some(server_type) = self.server_type {
                server_type.apply_pixel_ratio(&mut params, self.pixel_ratio);
            }
        }

        params.insert(
            "BBOX".to_string(),
            ParamValue::from(self.extent.to_wms_string(axis_order(self.projection, v13))),
        );

        Some(append_params(url, &params))
    }
}

/// Choose the endpoint for a tile, spreading tiles over all configured URLs.
fn pick_url<'a>(urls: &'a [String], tile_coord: &TileCoord) -> Option<&'a str> {
    match urls.len() {
        0 => None,
        1 => Some(urls[0].as_str()),
        n => Some(urls[(tile_coord.hash() % n as u64) as usize].as_str()),
    }
}

/// Scale a pixel size by a device pixel ratio, rounding to whole pixels.
pub fn scale_size(size: (u32, u32), pixel_ratio: f64) -> (u32, u32) {
    let scale = |v: u32| (v as f64 * pixel_ratio + 0.5).floor() as u32;
    (scale(size.0), scale(size.1))
}

/// Axis order a request in `version` uses for `projection`.
pub fn axis_order(projection: CrsCode, v13: bool) -> AxisOrder {
    if v13 {
        projection.axis_order_wms_1_3()
    } else {
        projection.axis_order_wms_1_1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::base_params;
    use test_utils::{params, split_url};

    fn request(urls: &[String], projection: CrsCode) -> TileRequest<'_> {
        TileRequest {
            urls,
            tile_coord: TileCoord::new(1, 0, 0),
            size: (256, 256),
            extent: BoundingBox::new(-180.0, 0.0, 0.0, 90.0),
            pixel_ratio: 1.0,
            projection,
            server_type: None,
        }
    }

    #[test]
    fn test_server_type_parsing() {
        assert_eq!("GeoServer".parse::<ServerType>().unwrap(), ServerType::GeoServer);
        assert_eq!("qgis".parse::<ServerType>().unwrap(), ServerType::Qgis);
        assert!(matches!(
            "arcgis".parse::<ServerType>(),
            Err(WmsError::UnsupportedServerType(_))
        ));
    }

    #[test]
    fn test_geoserver_dpi_appends_to_format_options() {
        let mut p = params! { "FORMAT_OPTIONS" => "antialias:none" };
        ServerType::GeoServer.apply_pixel_ratio(&mut p, 2.0);
        assert_eq!(p["FORMAT_OPTIONS"].as_str(), Some("antialias:none;dpi:180"));

        let mut p = params! {};
        ServerType::GeoServer.apply_pixel_ratio(&mut p, 1.5);
        assert_eq!(p["FORMAT_OPTIONS"].as_str(), Some("dpi:135"));
    }

    #[test]
    fn test_mapserver_and_qgis_dpi() {
        let mut p = params! {};
        ServerType::MapServer.apply_pixel_ratio(&mut p, 2.0);
        assert_eq!(p["MAP_RESOLUTION"], ParamValue::Number(180.0));

        let mut p = params! {};
        ServerType::Qgis.apply_pixel_ratio(&mut p, 2.0);
        assert_eq!(p["DPI"], ParamValue::Number(180.0));
    }

    #[test]
    fn test_v13_geographic_swaps_bbox() {
        let urls = vec!["https://example.org/wms".to_string()];
        let url = request(&urls, CrsCode::Epsg4326)
            .url(base_params("GetMap"))
            .unwrap();

        let (_, query) = split_url(&url);
        assert_eq!(query["CRS"], "EPSG:4326");
        assert_eq!(query["BBOX"], "0,-180,90,0");
        assert_eq!(query["STYLES"], "");
        assert_eq!(query["WIDTH"], "256");
        assert!(!query.contains_key("SRS"));
    }

    #[test]
    fn test_v11_uses_srs_and_xy() {
        let urls = vec!["https://example.org/wms".to_string()];
        let mut p = base_params("GetMap");
        p.insert("VERSION".to_string(), ParamValue::from("1.1.1"));

        let url = request(&urls, CrsCode::Epsg4326).url(p).unwrap();
        let (_, query) = split_url(&url);
        assert_eq!(query["SRS"], "EPSG:4326");
        assert_eq!(query["BBOX"], "-180,0,0,90");
        assert!(!query.contains_key("CRS"));
    }

    #[test]
    fn test_no_urls() {
        assert!(request(&[], CrsCode::Epsg3857)
            .url(base_params("GetMap"))
            .is_none());
    }

    #[test]
    fn test_pick_url_is_stable_per_tile() {
        let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let coord = TileCoord::new(2, 1, 3);
        assert_eq!(pick_url(&urls, &coord), Some("b"));
        assert_eq!(pick_url(&urls, &coord), pick_url(&urls, &coord));
    }

    #[test]
    fn test_scale_size() {
        assert_eq!(scale_size((256, 256), 2.0), (512, 512));
        assert_eq!(scale_size((266, 266), 1.5), (399, 399));
    }

    #[test]
    fn test_axis_order() {
        assert_eq!(axis_order(CrsCode::Epsg4326, true), AxisOrder::LatLon);
        assert_eq!(axis_order(CrsCode::Epsg4326, false), AxisOrder::XY);
    }
}
