//! Shared test utilities for the observation data-access workspace.
//!
//! This crate provides:
//! - Dataset, entity and observation builders
//! - A sample catalog in YAML form
//! - Temporary file helpers for configuration tests
//! - Approximate equality assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, DatasetBuilder, SAMPLE_CATALOG};
//! ```

pub mod catalog;
pub mod fixtures;

pub use catalog::*;
pub use fixtures::*;

/// Approximate equality for raw storage aggregates, which are plain `f64`
/// sums and quotients before any decimal rounding.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(avg, 11.17, 0.005);
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

/// Asserts that a value renders to the expected decimal string, e.g. a
/// rounded quantity compared against `"10.00"`.
///
/// ```ignore
/// use test_utils::assert_decimal_str;
///
/// assert_decimal_str!(value, "12.35");
/// ```
#[macro_export]
macro_rules! assert_decimal_str {
    ($value:expr, $expected:expr) => {{
        let rendered = $value.to_string();
        if rendered != $expected {
            panic!(
                "assertion failed: decimal mismatch\n  left: `{}`,\n right: `{}`",
                rendered, $expected
            );
        }
    }};
}
