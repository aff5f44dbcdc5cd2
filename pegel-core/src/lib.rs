//! pegel-core
//!
//! Core types and cleaning engine shared across the pegel ecosystem.
//!
//! - `frame`: the time-indexed observation table (`Frame`, `Column`).
//! - `timeseries`: bounded-gap filling and series regularization.
//! - `query`: the request types understood by hydrology sources.
//! - `source`: the async `HydroSource` trait implemented by stores.
//!
//! The cleaning engine is pure and synchronous: both
//! [`GapFill::fill`](timeseries::fill::GapFill::fill) and
//! [`to_series`](timeseries::regularize::to_series) take `&Frame` and build
//! new values, so frames can be shared freely across tasks. Only the source
//! seam is async, and it assumes a Tokio 1.x runtime like the rest of the
//! workspace.
//!
//! Diagnostics are structured data first: filling returns a
//! [`FillReport`](timeseries::fill::FillReport) with one outcome per
//! detected gap. With the optional `tracing` feature enabled, warning and
//! debug events are additionally emitted at the library level.
#![warn(missing_docs)]

/// Workspace-wide error type.
pub mod error;
/// Sampling intervals and aggregation windows.
pub mod every;
/// The time-indexed observation table.
pub mod frame;
/// Request types for hydrology sources.
pub mod query;
/// The async source trait implemented by stores.
pub mod source;
/// Bounded-gap filling, frequency inference, and regularization.
pub mod timeseries;

pub use error::PegelError;
pub use every::Every;
pub use frame::{Column, Frame, FrameBuilder, Values, FILLED_SUFFIX, LOCATION_COLUMN, TIME_COLUMN};
pub use query::{AggregateFn, HydroQuery, HydroQueryBuilder, Period, TimeBound};
pub use source::HydroSource;
pub use timeseries::fill::{FillMethod, FillReport, FillStrategy, GapFill, GapOutcome, GapRecord};
pub use timeseries::infer::{conforms_to, infer_every, MIN_INFER_POINTS};
pub use timeseries::regularize::{to_series, RegularSeries};
