//! Options shared by every tile source, and the trait giving adapters access
//! to them.
//!
//! A [`TileSourceContext`] carries what the parent map component owns:
//! attribution, caching and transport options, the active projection, the
//! tile grid and the endpoint URL. Adapters for concrete source kinds compose
//! a context and implement [`TileSourceAdapter`] on top of it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;
use wms_common::{CrsCode, TileGrid};
use wms_protocol::{TileUrl, TileUrlFunction};

/// Read access to the map view a source is displayed in.
pub trait MapView: Send + Sync {
    /// Current resolution in map units per pixel, if the view has one yet.
    fn resolution(&self) -> Option<f64>;
}

/// A view pinned to one resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedView {
    pub resolution: f64,
}

impl MapView for FixedView {
    fn resolution(&self) -> Option<f64> {
        Some(self.resolution)
    }
}

/// Rendering and transport options a tile source inherits from its parent.
#[derive(Clone)]
pub struct TileSourceContext {
    pub attributions: Vec<String>,
    pub cache_size: usize,
    pub cross_origin: Option<String>,
    pub logo: Option<String>,
    pub projection: CrsCode,
    pub reprojection_error_threshold: f64,
    pub tile_grid: Option<TileGrid>,
    pub wrap_x: bool,
    /// Endpoint URL template. `{name}` is replaced from `url_tokens`;
    /// `{a-c}` and `{1-4}` expand into several endpoints.
    pub url: Option<String>,
    pub url_tokens: BTreeMap<String, String>,
    /// Replaces the endpoint URL for tile requests when set.
    pub tile_url_function: Option<TileUrlFunction>,
    pub view: Option<Arc<dyn MapView>>,
}

impl Default for TileSourceContext {
    fn default() -> Self {
        Self {
            attributions: Vec::new(),
            cache_size: 2048,
            cross_origin: None,
            logo: None,
            projection: CrsCode::Epsg3857,
            reprojection_error_threshold: 0.5,
            tile_grid: None,
            wrap_x: true,
            url: None,
            url_tokens: BTreeMap::new(),
            tile_url_function: None,
            view: None,
        }
    }
}

impl fmt::Debug for TileSourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileSourceContext")
            .field("attributions", &self.attributions)
            .field("cache_size", &self.cache_size)
            .field("cross_origin", &self.cross_origin)
            .field("logo", &self.logo)
            .field("projection", &self.projection)
            .field("reprojection_error_threshold", &self.reprojection_error_threshold)
            .field("tile_grid", &self.tile_grid)
            .field("wrap_x", &self.wrap_x)
            .field("url", &self.url)
            .field("url_tokens", &self.url_tokens)
            .field("tile_url_function", &self.tile_url_function.is_some())
            .field("view", &self.view.is_some())
            .finish()
    }
}

impl TileSourceContext {
    /// The URL template with every known `{token}` substituted.
    ///
    /// Unknown tokens are left in place.
    pub fn replace_url_tokens(&self) -> Option<String> {
        let template = self.url.as_deref()?;
        let mut resolved = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let token = &rest[start + 1..start + len];
            resolved.push_str(&rest[..start]);

            match self.url_tokens.get(token) {
                Some(value) => resolved.push_str(value),
                None => {
                    if !is_range_token(token) {
                        warn!(token = %token, url = %template, "Unresolved URL token");
                    }
                    resolved.push_str(&rest[start..=start + len]);
                }
            }
            rest = &rest[start + len + 1..];
        }
        resolved.push_str(rest);

        Some(resolved)
    }

    /// The endpoint the tile source should be created with.
    pub fn resolved_url(&self) -> Option<TileUrl> {
        if let Some(function) = &self.tile_url_function {
            return Some(TileUrl::Function(function.clone()));
        }

        let mut urls = expand_url(&self.replace_url_tokens()?);
        if urls.len() == 1 {
            urls.pop().map(TileUrl::Single)
        } else {
            Some(TileUrl::Multiple(urls))
        }
    }
}

/// Shared accessors for adapters built on a [`TileSourceContext`].
pub trait TileSourceAdapter {
    fn context(&self) -> &TileSourceContext;

    /// Projection the map currently renders in.
    fn current_projection(&self) -> CrsCode {
        self.context().projection
    }

    /// Resolution of the view, if there is a view with a resolution.
    fn current_resolution(&self) -> Option<f64> {
        self.context().view.as_ref().and_then(|view| view.resolution())
    }

    fn resolved_url(&self) -> Option<TileUrl> {
        self.context().resolved_url()
    }
}

/// `a-c` or `1-4` style ranges.
fn is_range_token(token: &str) -> bool {
    parse_range(token).is_some()
}

fn parse_range(token: &str) -> Option<Vec<String>> {
    let (start, end) = token.split_once('-')?;

    let mut start_chars = start.chars();
    let mut end_chars = end.chars();
    if let (Some(a), None, Some(b), None) = (
        start_chars.next(),
        start_chars.next(),
        end_chars.next(),
        end_chars.next(),
    ) {
        if a.is_ascii_lowercase() && b.is_ascii_lowercase() && a <= b {
            return Some((a..=b).map(String::from).collect());
        }
    }

    let start: u32 = start.parse().ok()?;
    let end: u32 = end.parse().ok()?;
    if start > end {
        return None;
    }
    Some((start..=end).map(|n| n.to_string()).collect())
}

/// Expand the first `{a-c}` / `{1-4}` range in a URL into one URL per value.
pub fn expand_url(url: &str) -> Vec<String> {
    let mut search_from = 0;
    while let Some(offset) = url[search_from..].find('{') {
        let start = search_from + offset;
        let Some(len) = url[start..].find('}') else {
            break;
        };
        if let Some(values) = parse_range(&url[start + 1..start + len]) {
            let (prefix, suffix) = (&url[..start], &url[start + len + 1..]);
            return values
                .iter()
                .map(|value| format!("{}{}{}", prefix, value, suffix))
                .collect();
        }
        search_from = start + len + 1;
    }
    vec![url.to_string()]
}
