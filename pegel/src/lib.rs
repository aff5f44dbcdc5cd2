//! pegel
//!
//! High-level entry point for retrieving and cleaning irregularly-sampled
//! hydrological time series. A [`Pegel`] instance wires one
//! [`HydroSource`] (the remote Existenz store, or a mock) to the cleaning
//! engine from `pegel-core` and runs the pipeline:
//!
//! raw frame → bounded-gap fill → regular, timezone-naive series.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pegel::{Every, GapFill, HydroQuery, Pegel, Period};
//! use pegel_existenz::ExistenzStore;
//!
//! # async fn run() -> Result<(), pegel::PegelError> {
//! let pegel = Pegel::builder()
//!     .source(Arc::new(ExistenzStore::new()?))
//!     .build()?;
//!
//! let query = HydroQuery::builder()
//!     .period(Period::last(Every::days(7)?))
//!     .location("2030")
//!     .build()?;
//!
//! let report = pegel
//!     .fetch_series(&query, &GapFill::new(2).mark_filled(true), None)
//!     .await?;
//! println!(
//!     "{} rows at {} with {} unfilled gaps",
//!     report.series.len(),
//!     report.series.freq(),
//!     report.gaps.len()
//! );
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

mod core;

pub use crate::core::{Pegel, PegelBuilder, SeriesReport};
pub use pegel_core::{
    AggregateFn, Column, Every, FillMethod, FillReport, FillStrategy, Frame, FrameBuilder,
    GapFill, GapOutcome, GapRecord, HydroQuery, HydroQueryBuilder, HydroSource, PegelError,
    Period, RegularSeries, TimeBound, Values, to_series,
};
