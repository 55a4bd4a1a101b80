//! YAML source configuration.
//!
//! One file describes one WMS source: the endpoint, the request parameters
//! and the tile-source options.
//!
//! ```yaml
//! url: "https://{host}/geoserver/wms"
//! url_tokens:
//!   host: maps.example.org
//! layers: topp:states
//! styles: population
//! ext_params:
//!   format: image/jpeg
//!   cql_filter: "PERSONS > 1000000"
//! server_type: geoserver
//! hidpi: true
//! projection: EPSG:3857
//! resolution: 9783.94
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wms_common::{CrsCode, ExtraParams, TileGrid, WmsError, WmsResult, DEFAULT_WMS_VERSION};

use crate::adapter::WmsSourceAdapter;
use crate::context::{FixedView, MapView, TileSourceContext};
use crate::props::WmsProps;

/// A WMS source as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    // === Request parameters ===
    pub layers: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub styles: Option<String>,

    /// Free-form parameters, any key casing.
    #[serde(default, alias = "extParams")]
    pub ext_params: Option<ExtraParams>,

    // === Construction options ===
    #[serde(default)]
    pub gutter: u32,

    #[serde(default)]
    pub hidpi: bool,

    #[serde(default, alias = "serverType")]
    pub server_type: Option<String>,

    // === Tile source options ===
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, alias = "urlTokens")]
    pub url_tokens: BTreeMap<String, String>,

    #[serde(default)]
    pub attributions: Vec<String>,

    #[serde(default = "default_cache_size", alias = "cacheSize")]
    pub cache_size: usize,

    #[serde(default, alias = "crossOrigin")]
    pub cross_origin: Option<String>,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub projection: CrsCode,

    #[serde(
        default = "default_reprojection_error_threshold",
        alias = "reprojectionErrorThreshold"
    )]
    pub reprojection_error_threshold: f64,

    #[serde(default, alias = "tileGrid")]
    pub tile_grid: Option<TileGrid>,

    #[serde(default = "default_wrap_x", alias = "wrapX")]
    pub wrap_x: bool,

    /// Resolution of the view the source is shown in.
    #[serde(default)]
    pub resolution: Option<f64>,
}

fn default_version() -> String {
    DEFAULT_WMS_VERSION.to_string()
}

fn default_cache_size() -> usize {
    2048
}

fn default_reprojection_error_threshold() -> f64 {
    0.5
}

fn default_wrap_x() -> bool {
    true
}

impl SourceConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> WmsResult<Self> {
        let config: SourceConfig = serde_yaml::from_str(yaml)
            .map_err(|e| WmsError::ConfigError(format!("YAML error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> WmsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WmsError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), layers = %config.layers, "Loaded WMS source config");
        Ok(config)
    }

    pub fn validate(&self) -> WmsResult<()> {
        if self.layers.trim().is_empty() {
            return Err(WmsError::MissingParameter("layers".to_string()));
        }
        if !self.reprojection_error_threshold.is_finite() || self.reprojection_error_threshold <= 0.0 {
            return Err(WmsError::ConfigError(format!(
                "reprojection_error_threshold must be positive, got {}",
                self.reprojection_error_threshold
            )));
        }
        if let Some(resolution) = self.resolution {
            if !resolution.is_finite() || resolution <= 0.0 {
                return Err(WmsError::ConfigError(format!(
                    "resolution must be positive, got {}",
                    resolution
                )));
            }
        }
        if let Some(grid) = &self.tile_grid {
            grid.validate()?;
        }
        Ok(())
    }

    /// Split into adapter inputs and tile-source context.
    pub fn into_parts(self) -> (WmsProps, TileSourceContext) {
        let props = WmsProps {
            layers: self.layers,
            version: self.version,
            styles: self.styles,
            ext_params: self.ext_params,
            gutter: self.gutter,
            hidpi: self.hidpi,
            server_type: self.server_type,
        };

        let view = self
            .resolution
            .map(|resolution| Arc::new(FixedView { resolution }) as Arc<dyn MapView>);

        let context = TileSourceContext {
            attributions: self.attributions,
            cache_size: self.cache_size,
            cross_origin: self.cross_origin,
            logo: self.logo,
            projection: self.projection,
            reprojection_error_threshold: self.reprojection_error_threshold,
            tile_grid: self.tile_grid,
            wrap_x: self.wrap_x,
            url: self.url,
            url_tokens: self.url_tokens,
            tile_url_function: None,
            view,
        };

        (props, context)
    }

    /// Unmounted adapter for this source.
    pub fn into_adapter(self) -> WmsResult<WmsSourceAdapter> {
        let (props, context) = self.into_parts();
        WmsSourceAdapter::new(props, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wms_common::ParamValue;

    #[test]
    fn test_minimal_config_defaults() {
        let config = SourceConfig::from_yaml_str("layers: topp:states\n").unwrap();

        assert_eq!(config.version, "1.3.0");
        assert_eq!(config.cache_size, 2048);
        assert_eq!(config.projection, CrsCode::Epsg3857);
        assert!(config.wrap_x);
        assert!(!config.hidpi);
        assert!(config.url.is_none());
    }

    #[test]
    fn test_camel_case_aliases() {
        let yaml = r#"
layers: topp:states
extParams:
  Format: image/jpeg
  tiled: true
  feature_count: 5
serverType: mapserver
"#;
        let config = SourceConfig::from_yaml_str(yaml).unwrap();
        let ext = config.ext_params.unwrap();

        assert_eq!(ext["Format"], ParamValue::from("image/jpeg"));
        assert_eq!(ext["tiled"], ParamValue::Bool(true));
        assert_eq!(ext["feature_count"], ParamValue::Number(5.0));
        assert_eq!(config.server_type.as_deref(), Some("mapserver"));
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            SourceConfig::from_yaml_str("layers: ''\n"),
            Err(WmsError::MissingParameter(_))
        ));
        assert!(matches!(
            SourceConfig::from_yaml_str("layers: a\nresolution: -1\n"),
            Err(WmsError::ConfigError(_))
        ));
        assert!(matches!(
            SourceConfig::from_yaml_str("layers: a\nprojection: EPSG:1234\n"),
            Err(WmsError::ConfigError(_))
        ));
        assert!(SourceConfig::from_yaml_str("version: 1.3.0\n").is_err());
    }

    #[test]
    fn test_into_parts() {
        let yaml = "layers: a\nresolution: 100.0\nprojection: EPSG:4326\n";
        let (props, context) = SourceConfig::from_yaml_str(yaml).unwrap().into_parts();

        assert_eq!(props.layers, "a");
        assert_eq!(context.projection, CrsCode::Epsg4326);
        assert_eq!(context.view.and_then(|v| v.resolution()), Some(100.0));
    }
}
