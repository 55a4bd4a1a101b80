//! Canonical request parameters from free-form extras and managed fields.

use wms_common::params::{LAYERS, STYLES, VERSION};
use wms_common::{ExtraParams, ParamValue, RequestParams};

use crate::props::WmsProps;

/// Keys owned by explicit adapter fields. Extras can never set them.
pub const MANAGED_KEYS: [&str; 3] = [LAYERS, VERSION, STYLES];

/// Whether `key` (already upper-case) is owned by an explicit field.
pub fn is_managed_key(key: &str) -> bool {
    MANAGED_KEYS.contains(&key)
}

/// Upper-case every key and drop the managed ones.
///
/// Keys that only differ in case collapse into one entry; the one that comes
/// last in the input's key order wins. `None` is treated as an empty map.
/// The input is never modified.
pub fn normalize_params(raw: Option<&ExtraParams>) -> RequestParams {
    let Some(raw) = raw else {
        return RequestParams::new();
    };

    raw.iter()
        .map(|(key, value)| (key.to_uppercase(), value.clone()))
        .filter(|(key, _)| !is_managed_key(key))
        .collect()
}

/// The full parameter set a source is created with.
///
/// Normalized extras first, then LAYERS, STYLES and VERSION from the explicit
/// fields on top. An unset `styles` is carried as `Null`.
pub fn effective_params(props: &WmsProps) -> RequestParams {
    let mut params = normalize_params(props.ext_params.as_ref());
    params.insert(LAYERS.to_string(), ParamValue::from(props.layers.as_str()));
    params.insert(STYLES.to_string(), ParamValue::from(props.styles.clone()));
    params.insert(VERSION.to_string(), ParamValue::from(props.effective_version()));
    params
}
