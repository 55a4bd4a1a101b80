//! Helpers for inspecting generated request URLs.

use std::collections::BTreeMap;

/// Split a URL into its base and decoded query parameters.
///
/// Repeated keys keep the last value.
pub fn split_url(url: &str) -> (String, BTreeMap<String, String>) {
    match url.split_once('?') {
        Some((base, query)) => (base.to_string(), query_pairs(query)),
        None => (url.to_string(), BTreeMap::new()),
    }
}

/// Decode a `k=v&k2=v2` query string.
pub fn query_pairs(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url() {
        let (base, query) =
            split_url("https://example.org/wms?SERVICE=WMS&BBOX=0%2C0%2C1%2C1&STYLES=");
        assert_eq!(base, "https://example.org/wms");
        assert_eq!(query["SERVICE"], "WMS");
        assert_eq!(query["BBOX"], "0,0,1,1");
        assert_eq!(query["STYLES"], "");
    }

    #[test]
    fn test_no_query() {
        let (base, query) = split_url("/wms");
        assert_eq!(base, "/wms");
        assert!(query.is_empty());
    }
}
