//! Error types for the WMS source crates.

use thiserror::Error;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for WMS source operations.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Parameter Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid WMS version: {0}")]
    InvalidVersion(String),

    #[error("Unsupported server type: {0}")]
    UnsupportedServerType(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    // === Source Errors ===
    #[error("Invalid tile grid: {0}")]
    InvalidTileGrid(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Source already created for this adapter")]
    AlreadyMounted,

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl WmsError {
    /// Name of the request parameter this error refers to, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            WmsError::MissingParameter(param) => Some(param),
            WmsError::InvalidParameter { param, .. } => Some(param),
            WmsError::InvalidVersion(_) => Some("VERSION"),
            WmsError::UnsupportedServerType(_) => Some("serverType"),
            _ => None,
        }
    }
}
