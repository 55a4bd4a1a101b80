//! Loading source configuration files.

use std::io::Write;

use tempfile::NamedTempFile;
use test_utils::{layers, split_url};
use wms_common::{CrsCode, TileCoord, WmsError};
use wms_source::SourceConfig;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_mount() {
    let file = write_config(
        r#"
url: "https://{host}/geoserver/{workspace}/wms"
url_tokens:
  host: maps.example.org
  workspace: topp
layers: topp:states
styles: population
ext_params:
  format: image/jpeg
  Transparent: false
"#,
    );

    let config = SourceConfig::load(file.path()).unwrap();
    assert_eq!(config.layers, layers::TOPP_STATES);

    let mut adapter = config.into_adapter().unwrap();
    adapter.mount().unwrap();

    let url = adapter.tile_url(TileCoord::new(0, 0, 0), 1.0).unwrap();
    let (base, query) = split_url(&url);
    assert_eq!(base, "https://maps.example.org/geoserver/topp/wms");
    assert_eq!(query["FORMAT"], "image/jpeg");
    assert_eq!(query["TRANSPARENT"], "false");
    assert_eq!(query["STYLES"], "population");
}

#[test]
fn test_load_geographic_with_view() {
    let file = write_config(
        r#"
url: https://maps.example.org/geoserver/wms
layers: ne:countries
version: 1.1.1
projection: EPSG:4326
resolution: 1.40625
ext_params:
  info_format: application/json
"#,
    );

    let config = SourceConfig::load(file.path()).unwrap();
    assert_eq!(config.projection, CrsCode::Epsg4326);

    let mut adapter = config.into_adapter().unwrap();
    adapter.mount().unwrap();

    let url = adapter
        .get_feature_info_url([-90.0, 45.0], None, None, None)
        .unwrap()
        .unwrap();
    let (_, query) = split_url(&url);
    assert_eq!(query["SRS"], "EPSG:4326");
    assert_eq!(query["X"], "64");
    assert_eq!(query["Y"], "32");
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = SourceConfig::load(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(WmsError::ConfigError(_))));
}

#[test]
fn test_load_malformed_yaml() {
    let file = write_config("layers: [unterminated\n");
    assert!(matches!(
        SourceConfig::load(file.path()),
        Err(WmsError::ConfigError(_))
    ));
}

#[test]
fn test_unknown_server_type_fails_at_mount() {
    let file = write_config("url: https://example.org/wms\nlayers: a\nserver_type: arcgis\n");
    let mut adapter = SourceConfig::load(file.path()).unwrap().into_adapter().unwrap();

    assert!(matches!(
        adapter.mount(),
        Err(WmsError::UnsupportedServerType(_))
    ));
    assert!(!adapter.is_mounted());
}
