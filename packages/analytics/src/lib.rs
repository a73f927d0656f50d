#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation and trend modeling over cleaned incident records.
//!
//! The pipeline is a chain of pure functions: [`aggregate`] groups records
//! into per-period counts, [`series`] derives running totals and
//! period-over-period percent change, [`trend`] fits ordinary least squares
//! lines, and [`pipeline`] wires them together once per scope. Every stage
//! returns a new value and never mutates its input.

pub mod aggregate;
pub mod pipeline;
pub mod series;
pub mod trend;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// The x and y sequences have different lengths.
    #[error("Mismatched series lengths: {x_len} x values, {y_len} y values")]
    LengthMismatch {
        /// Number of x values.
        x_len: usize,
        /// Number of y values.
        y_len: usize,
    },

    /// Too few points to determine a line.
    #[error("Insufficient data: need at least {needed} points, found {found}")]
    InsufficientData {
        /// Minimum number of points required.
        needed: usize,
        /// Number of points supplied.
        found: usize,
    },

    /// Every x value is identical, so the slope is undefined.
    #[error("Zero variance in x: every x value is {value}")]
    ZeroVariance {
        /// The shared x value, formatted.
        value: String,
    },

    /// An input value is NaN or infinite.
    #[error("Non-finite input at index {index}")]
    NonFinite {
        /// Position of the offending pair.
        index: usize,
    },
}
