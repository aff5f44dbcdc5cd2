//! Time-series cleaning utilities shared by stores and the facade.
//!
//! Modules include:
//! - `fill`: bounded-gap filling with per-run outcome reporting
//! - `infer`: strict frequency inference and spacing conformance
//! - `regularize`: conversion of frames into regular, tz-naive series

/// Bounded-gap filling with per-run outcome reporting.
pub mod fill;
/// Strict frequency inference and spacing conformance helpers.
pub mod infer;
/// Conversion of frames into regular, timezone-naive series.
pub mod regularize;
