//! Shared test utilities for the wms-source workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate floating-point assertions
//! - A `params!` macro for building parameter maps
//! - Query-string decoding for asserting on request URLs
//! - Common test fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod query;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use query::*;

#[doc(hidden)]
pub use wms_common as __wms_common;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of coordinate pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Build a parameter map from `key => value` pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::params;
///
/// let p = params! { "info_format" => "text/plain", "feature_count" => 5 };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::collections::BTreeMap::<String, $crate::__wms_common::ParamValue>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = ::std::collections::BTreeMap::<String, $crate::__wms_common::ParamValue>::new();
        $(
            map.insert(($key).to_string(), $crate::__wms_common::ParamValue::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use wms_common::ParamValue;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_coords_approx_eq_passes() {
        assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
    }

    #[test]
    fn test_params_macro() {
        let empty = params! {};
        assert!(empty.is_empty());

        let p = params! { "foo" => 1, "Bar" => "x", "tiled" => true };
        assert_eq!(p.len(), 3);
        assert_eq!(p["foo"], ParamValue::Number(1.0));
        assert_eq!(p["Bar"], ParamValue::Text("x".to_string()));
        assert_eq!(p["tiled"], ParamValue::Bool(true));
    }
}
