//! WMS GetFeatureInfo request building
//!
//! A feature-info query names a pixel inside a map image. The image used is
//! the tile that contains the queried coordinate, so the server sees exactly
//! the request the tile itself was fetched with plus the pixel position.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use wms_common::{BoundingBox, ParamValue, RequestParams, WmsError};

/// Common GetFeatureInfo response formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum InfoFormat {
    /// application/json - Machine-readable JSON
    #[serde(rename = "application/json")]
    Json,
    /// text/html - Human-readable HTML for popups
    #[serde(rename = "text/html")]
    #[default]
    Html,
    /// text/xml - OGC-compliant XML
    #[serde(rename = "text/xml")]
    Xml,
    /// text/plain - Simple text format
    #[serde(rename = "text/plain")]
    Text,
    /// application/vnd.ogc.gml - GML features
    #[serde(rename = "application/vnd.ogc.gml")]
    Gml,
}

impl InfoFormat {
    /// Parse from MIME type string
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "application/json" => Some(InfoFormat::Json),
            "text/html" => Some(InfoFormat::Html),
            "text/xml" => Some(InfoFormat::Xml),
            "text/plain" => Some(InfoFormat::Text),
            "application/vnd.ogc.gml" => Some(InfoFormat::Gml),
            _ => None,
        }
    }

    /// Get MIME type string
    pub fn to_mime(&self) -> &'static str {
        match self {
            InfoFormat::Json => "application/json",
            InfoFormat::Html => "text/html",
            InfoFormat::Xml => "text/xml",
            InfoFormat::Text => "text/plain",
            InfoFormat::Gml => "application/vnd.ogc.gml",
        }
    }
}

impl FromStr for InfoFormat {
    type Err = WmsError;

    /// Accepts a MIME type or a short name (`json`, `html`, `xml`, `text`, `gml`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = match s.to_lowercase().as_str() {
            "json" => Some(InfoFormat::Json),
            "html" => Some(InfoFormat::Html),
            "xml" => Some(InfoFormat::Xml),
            "text" | "plain" => Some(InfoFormat::Text),
            "gml" => Some(InfoFormat::Gml),
            _ => None,
        };
        short
            .or_else(|| InfoFormat::from_mime(s))
            .ok_or_else(|| WmsError::InvalidParameter {
                param: "INFO_FORMAT".to_string(),
                message: format!("unknown format '{}'", s),
            })
    }
}

/// True when the merged parameters name a response format.
pub fn has_info_format(params: &RequestParams) -> bool {
    params
        .get("INFO_FORMAT")
        .is_some_and(|value| !value.is_null() && !value.to_string().is_empty())
}

/// Pixel holding `coordinate` inside an image covering `extent` at `resolution`.
///
/// Returns (column, row), counted from the top-left pixel.
pub fn feature_info_pixel(coordinate: [f64; 2], extent: &BoundingBox, resolution: f64) -> (i64, i64) {
    let [x, y] = coordinate;
    let (left, top) = extent.top_left();

    let i = ((x - left) / resolution).floor() as i64;
    let j = ((top - y) / resolution).floor() as i64;

    (i, j)
}

/// Add the pixel position under the key names of the request's version.
pub fn insert_pixel(params: &mut RequestParams, pixel: (i64, i64), v13: bool) {
    let (i_key, j_key) = if v13 { ("I", "J") } else { ("X", "Y") };
    params.insert(i_key.to_string(), ParamValue::from(pixel.0));
    params.insert(j_key.to_string(), ParamValue::from(pixel.1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::params;

    #[test]
    fn test_feature_info_pixel() {
        // Center of a 256x256 image covering [-180, -90, 180, 90]
        let extent = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let (i, j) = feature_info_pixel([0.0, 0.0], &extent, 360.0 / 256.0);
        assert_eq!((i, j), (128, 64));

        let (i, j) = feature_info_pixel([-180.0, 90.0], &extent, 360.0 / 256.0);
        assert_eq!((i, j), (0, 0));
    }

    #[test]
    fn test_info_format_parsing() {
        assert_eq!(
            InfoFormat::from_mime("application/json"),
            Some(InfoFormat::Json)
        );
        assert_eq!(InfoFormat::from_mime("text/html"), Some(InfoFormat::Html));
        assert_eq!(InfoFormat::from_mime("TEXT/HTML"), Some(InfoFormat::Html));
        assert_eq!("json".parse::<InfoFormat>().unwrap(), InfoFormat::Json);
        assert_eq!("text/plain".parse::<InfoFormat>().unwrap(), InfoFormat::Text);
        assert!("image/png".parse::<InfoFormat>().is_err());
    }

    #[test]
    fn test_has_info_format() {
        assert!(has_info_format(&params! { "INFO_FORMAT" => "text/plain" }));
        assert!(!has_info_format(&params! { "INFO_FORMAT" => "" }));
        assert!(!has_info_format(&params! { "info_format" => "text/plain" }));

        let mut p = params! {};
        p.insert("INFO_FORMAT".to_string(), ParamValue::Null);
        assert!(!has_info_format(&p));
    }

    #[test]
    fn test_pixel_keys_follow_version() {
        let mut p = params! {};
        insert_pixel(&mut p, (3, 4), true);
        assert_eq!(p["I"], ParamValue::Number(3.0));
        assert_eq!(p["J"], ParamValue::Number(4.0));

        let mut p = params! {};
        insert_pixel(&mut p, (3, 4), false);
        assert!(p.contains_key("X") && p.contains_key("Y"));
    }
}
