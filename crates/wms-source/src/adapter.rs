//! The WMS source adapter.
//!
//! Owns the declarative [`WmsProps`], creates the live source once on
//! [`mount`](WmsSourceAdapter::mount) and afterwards forwards each change of a
//! synchronized input as a single parameter patch.

use std::fmt;

use projection::point_from_lon_lat;
use tracing::{debug, info, warn};
use wms_common::params::{LAYERS, STYLES, VERSION};
use wms_common::{CrsCode, ExtraParams, ParamValue, RequestParams, TileCoord, WmsError, WmsResult};
use wms_protocol::TileWmsOptions;

use crate::context::{TileSourceAdapter, TileSourceContext};
use crate::engine::{TileWmsFactory, WmsSourceFactory, WmsSourceHandle};
use crate::normalize::{effective_params, normalize_params};
use crate::props::{version_or_default, WmsProps};

/// Binds [`WmsProps`] to a live tile source.
pub struct WmsSourceAdapter<F: WmsSourceFactory = TileWmsFactory> {
    context: TileSourceContext,
    props: WmsProps,
    factory: F,
    source: Option<F::Handle>,
}

impl<F: WmsSourceFactory> fmt::Debug for WmsSourceAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WmsSourceAdapter")
            .field("context", &self.context)
            .field("props", &self.props)
            .field("mounted", &self.source.is_some())
            .finish()
    }
}

impl WmsSourceAdapter<TileWmsFactory> {
    /// Adapter creating [`wms_protocol::TileWmsSource`] instances.
    pub fn new(props: WmsProps, context: TileSourceContext) -> WmsResult<Self> {
        Self::with_factory(props, context, TileWmsFactory)
    }
}

impl<F: WmsSourceFactory> WmsSourceAdapter<F> {
    pub fn with_factory(props: WmsProps, context: TileSourceContext, factory: F) -> WmsResult<Self> {
        props.validate()?;
        Ok(Self {
            context,
            props,
            factory,
            source: None,
        })
    }

    pub fn props(&self) -> &WmsProps {
        &self.props
    }

    /// The live source, if mounted.
    pub fn source(&self) -> Option<&F::Handle> {
        self.source.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.source.is_some()
    }

    /// Options the live source is created with.
    pub fn source_options(&self) -> TileWmsOptions {
        let ctx = &self.context;
        TileWmsOptions {
            attributions: ctx.attributions.clone(),
            cache_size: ctx.cache_size,
            params: effective_params(&self.props),
            cross_origin: ctx.cross_origin.clone(),
            gutter: self.props.gutter,
            hidpi: self.props.hidpi,
            logo: ctx.logo.clone(),
            tile_grid: ctx.tile_grid.clone(),
            projection: ctx.projection,
            reprojection_error_threshold: ctx.reprojection_error_threshold,
            server_type: self.props.server_type.clone(),
            wrap_x: ctx.wrap_x,
            url: ctx.resolved_url(),
        }
    }

    /// Build a new source from the current inputs without binding it.
    pub fn create_source(&self) -> WmsResult<F::Handle> {
        self.factory.create(self.source_options())
    }

    /// Create the live source. Fails if one already exists.
    pub fn mount(&mut self) -> WmsResult<()> {
        if self.source.is_some() {
            return Err(WmsError::AlreadyMounted);
        }

        let source = self.create_source()?;
        info!(
            layers = %self.props.layers,
            version = %self.props.effective_version(),
            projection = %self.context.projection,
            "Mounted WMS source"
        );
        self.source = Some(source);
        Ok(())
    }

    /// Drop the live source. Inputs are kept for the next mount.
    pub fn unmount(&mut self) {
        if self.source.take().is_some() {
            debug!(layers = %self.props.layers, "Unmounted WMS source");
        }
    }

    pub fn on_layers_changed(&mut self, layers: impl Into<String>) {
        self.props.layers = layers.into();
        let value = ParamValue::from(self.props.layers.as_str());
        self.push(single(LAYERS, value));
    }

    pub fn on_version_changed(&mut self, version: impl Into<String>) {
        self.props.version = version.into();
        let value = ParamValue::from(version_or_default(&self.props.version));
        self.push(single(VERSION, value));
    }

    pub fn on_styles_changed(&mut self, styles: Option<String>) {
        self.props.styles = styles;
        let value = ParamValue::from(self.props.styles.clone());
        self.push(single(STYLES, value));
    }

    /// Replace the extra parameters and overlay their normalized form.
    ///
    /// Keys only present in the old extras stay on the live source.
    pub fn on_ext_params_changed(&mut self, ext_params: Option<ExtraParams>) {
        self.props.ext_params = ext_params;
        let patch = normalize_params(self.props.ext_params.as_ref());
        self.push(patch);
    }

    /// Move to `next`, firing the reaction of every synchronized input that
    /// changed. Extra parameters go last. Returns the number of reactions
    /// fired.
    ///
    /// `gutter`, `hidpi` and `server_type` are stored and take effect on the
    /// next mount.
    pub fn apply(&mut self, next: WmsProps) -> usize {
        let WmsProps {
            layers,
            version,
            styles,
            ext_params,
            gutter,
            hidpi,
            server_type,
        } = next;
        let mut fired = 0;

        if layers != self.props.layers {
            self.on_layers_changed(layers);
            fired += 1;
        }
        if version != self.props.version {
            self.on_version_changed(version);
            fired += 1;
        }
        if styles != self.props.styles {
            self.on_styles_changed(styles);
            fired += 1;
        }

        if gutter != self.props.gutter
            || hidpi != self.props.hidpi
            || server_type != self.props.server_type
        {
            if self.is_mounted() {
                warn!(
                    gutter,
                    hidpi,
                    server_type = ?server_type,
                    "Construction options changed on a mounted WMS source, applied on next mount"
                );
            }
            self.props.gutter = gutter;
            self.props.hidpi = hidpi;
            self.props.server_type = server_type;
        }

        if ext_params != self.props.ext_params {
            self.on_ext_params_changed(ext_params);
            fired += 1;
        }

        fired
    }

    /// GetFeatureInfo URL for a `[lon, lat]` coordinate in EPSG:4326.
    ///
    /// `resolution` and `projection` default to the view resolution and the
    /// context projection. Managed keys in `params` are ignored. Returns
    /// `Ok(None)` when unmounted, when no resolution is known, or when the
    /// source cannot build a URL.
    pub fn get_feature_info_url(
        &self,
        coordinate: [f64; 2],
        resolution: Option<f64>,
        projection: Option<CrsCode>,
        params: Option<&ExtraParams>,
    ) -> WmsResult<Option<String>> {
        let Some(source) = &self.source else {
            debug!("GetFeatureInfo requested on an unmounted WMS source");
            return Ok(None);
        };
        let Some(resolution) = resolution.or_else(|| self.current_resolution()) else {
            debug!("No resolution known for GetFeatureInfo");
            return Ok(None);
        };
        let projection = projection.unwrap_or_else(|| self.current_projection());

        let coordinate = point_from_lon_lat(coordinate, projection)?;
        let params = normalize_params(params);

        Ok(source.feature_info_url(coordinate, resolution, projection, params))
    }

    /// GetMap URL of one tile in the context projection.
    pub fn tile_url(&self, tile_coord: TileCoord, pixel_ratio: f64) -> Option<String> {
        self.source
            .as_ref()?
            .tile_url(tile_coord, pixel_ratio, self.current_projection())
    }

    fn push(&mut self, patch: RequestParams) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        debug!(patch = ?patch, "Patching WMS source params");
        source.update_params(patch);
    }
}

impl<F: WmsSourceFactory> TileSourceAdapter for WmsSourceAdapter<F> {
    fn context(&self) -> &TileSourceContext {
        &self.context
    }
}

fn single(key: &str, value: ParamValue) -> RequestParams {
    RequestParams::from([(key.to_string(), value)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{params, urls};

    fn adapter() -> WmsSourceAdapter {
        let context = TileSourceContext {
            url: Some(urls::GEOSERVER.to_string()),
            ..Default::default()
        };
        WmsSourceAdapter::new(WmsProps::new("topp:states"), context).unwrap()
    }

    #[test]
    fn test_rejects_empty_layers() {
        let result = WmsSourceAdapter::new(WmsProps::new(""), TileSourceContext::default());
        assert!(matches!(result, Err(WmsError::MissingParameter(p)) if p == "layers"));
    }

    #[test]
    fn test_mount_once() {
        let mut adapter = adapter();
        assert!(!adapter.is_mounted());

        adapter.mount().unwrap();
        assert!(adapter.is_mounted());
        assert!(matches!(adapter.mount(), Err(WmsError::AlreadyMounted)));

        adapter.unmount();
        assert!(adapter.source().is_none());
        adapter.mount().unwrap();
    }

    #[test]
    fn test_source_options() {
        let mut adapter = adapter();
        adapter.props.hidpi = true;
        adapter.props.server_type = Some("geoserver".to_string());
        adapter.props.ext_params = Some(params! { "format" => "image/jpeg" });

        let options = adapter.source_options();
        assert!(options.hidpi);
        assert_eq!(options.server_type.as_deref(), Some("geoserver"));
        assert_eq!(options.params["FORMAT"].as_str(), Some("image/jpeg"));
        assert_eq!(options.params["LAYERS"].as_str(), Some("topp:states"));
        assert_eq!(options.cache_size, 2048);
    }

    #[test]
    fn test_patch_updates_live_key() {
        let mut adapter = adapter();
        adapter.mount().unwrap();
        let before = adapter.source().unwrap().key().to_string();

        adapter.on_styles_changed(Some("population".to_string()));
        let source = adapter.source().unwrap();
        assert_ne!(source.key(), before);
        assert_eq!(source.params()["STYLES"].as_str(), Some("population"));
    }

    #[test]
    fn test_tile_url_requires_mount() {
        let mut adapter = adapter();
        assert!(adapter.tile_url(TileCoord::new(0, 0, 0), 1.0).is_none());

        adapter.mount().unwrap();
        assert!(adapter.tile_url(TileCoord::new(0, 0, 0), 1.0).is_some());
    }
}
