//! pegel-mock
//!
//! Deterministic in-memory [`HydroSource`] for CI-safe tests and examples.
//! Traces are generated from the query itself (locations, fields, window),
//! so the same query always yields the same frame, gaps included.
#![warn(missing_docs)]

mod fixtures;

use async_trait::async_trait;
use pegel_core::{Frame, HydroQuery, HydroSource, PegelError};

/// Location identifier that always fails, for error-path tests.
pub const FAIL_LOCATION: &str = "0000";

/// Mock source producing deterministic fixture traces.
///
/// Honors the query's fields and locations, spaces rows by the aggregation
/// window, and applies the same location-column rule as the real store.
pub struct MockSource {
    rows: usize,
}

impl MockSource {
    /// Mock with the default trace length of 48 rows per location.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: 48 }
    }

    /// Mock with a custom trace length.
    #[must_use]
    pub const fn with_rows(rows: usize) -> Self {
        Self { rows }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HydroSource for MockSource {
    fn name(&self) -> &'static str {
        "pegel-mock"
    }

    async fn query_hydro(&self, query: &HydroQuery) -> Result<Frame, PegelError> {
        if query.locations().iter().any(|l| l == FAIL_LOCATION) {
            return Err(PegelError::store(
                "pegel-mock",
                format!("forced failure for location {FAIL_LOCATION}"),
            ));
        }
        fixtures::frame_for(query, self.rows)
    }
}
