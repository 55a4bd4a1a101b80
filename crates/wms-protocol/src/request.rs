//! Request parameter assembly and query-string encoding shared by all WMS requests.

use std::cmp::Ordering;

use wms_common::{ParamValue, RequestParams, WmsError, WmsResult, DEFAULT_WMS_VERSION};

/// Parameters every request starts from, before the source and call
/// parameters are merged over them.
pub fn base_params(request: &str) -> RequestParams {
    let mut params = RequestParams::new();
    params.insert("SERVICE".to_string(), ParamValue::from("WMS"));
    params.insert("VERSION".to_string(), ParamValue::from(DEFAULT_WMS_VERSION));
    params.insert("REQUEST".to_string(), ParamValue::from(request));
    params.insert("FORMAT".to_string(), ParamValue::from("image/png"));
    params.insert("TRANSPARENT".to_string(), ParamValue::from(true));
    params
}

/// Compare dotted version strings numerically ("1.10" > "1.9").
///
/// Missing or non-numeric segments count as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));

    for i in 0..a.len().max(b.len()) {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// True when the request parameters ask for WMS 1.3 or later.
pub fn is_v13(params: &RequestParams) -> bool {
    let version = params
        .get("VERSION")
        .and_then(ParamValue::as_str)
        .unwrap_or(DEFAULT_WMS_VERSION);
    compare_versions(version, "1.3") != Ordering::Less
}

/// Check a VERSION value is a dotted numeric string such as "1.1.1".
pub fn validate_version(value: &ParamValue) -> WmsResult<()> {
    let version = value.as_str().ok_or_else(|| WmsError::InvalidParameter {
        param: "VERSION".to_string(),
        message: format!("expected a string, got '{}'", value),
    })?;

    let valid = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(WmsError::InvalidVersion(version.to_string()))
    }
}

/// Append encoded parameters to a URL.
///
/// `Null` values are skipped. A trailing `?` or `&` on `uri` is dropped
/// before the query string is joined on.
pub fn append_params(uri: &str, params: &RequestParams) -> String {
    let query = params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let uri = uri
        .strip_suffix('?')
        .or_else(|| uri.strip_suffix('&'))
        .unwrap_or(uri);

    if query.is_empty() {
        return uri.to_string();
    }

    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}{}", uri, separator, query)
}
