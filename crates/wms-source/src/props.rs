//! WMS-specific adapter inputs.

use wms_common::{ExtraParams, WmsError, WmsResult, DEFAULT_WMS_VERSION};

/// Declarative inputs of a WMS source.
///
/// `layers`, `version`, `styles` and `ext_params` are synchronized into a live
/// source. `gutter`, `hidpi` and `server_type` are read when the source is
/// created.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsProps {
    pub layers: String,
    pub version: String,
    pub styles: Option<String>,
    pub ext_params: Option<ExtraParams>,
    pub gutter: u32,
    pub hidpi: bool,
    pub server_type: Option<String>,
}

impl WmsProps {
    pub fn new(layers: impl Into<String>) -> Self {
        Self {
            layers: layers.into(),
            version: DEFAULT_WMS_VERSION.to_string(),
            styles: None,
            ext_params: None,
            gutter: 0,
            hidpi: false,
            server_type: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_styles(mut self, styles: impl Into<String>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    pub fn with_ext_params(mut self, ext_params: ExtraParams) -> Self {
        self.ext_params = Some(ext_params);
        self
    }

    pub fn with_gutter(mut self, gutter: u32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn with_hidpi(mut self, hidpi: bool) -> Self {
        self.hidpi = hidpi;
        self
    }

    pub fn with_server_type(mut self, server_type: impl Into<String>) -> Self {
        self.server_type = Some(server_type.into());
        self
    }

    /// The version to request, falling back to 1.3.0 when blank.
    pub fn effective_version(&self) -> &str {
        version_or_default(&self.version)
    }

    /// Reject inputs without layers.
    pub fn validate(&self) -> WmsResult<()> {
        if self.layers.trim().is_empty() {
            return Err(WmsError::MissingParameter("layers".to_string()));
        }
        Ok(())
    }
}

pub(crate) fn version_or_default(version: &str) -> &str {
    if version.trim().is_empty() {
        DEFAULT_WMS_VERSION
    } else {
        version
    }
}
