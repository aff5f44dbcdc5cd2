use std::sync::Arc;

use pegel_core::{
    Every, FillReport, Frame, GapFill, GapRecord, HydroQuery, HydroSource, PegelError,
    RegularSeries, to_series,
};

/// Entry point wiring a hydrology source to the cleaning engine.
pub struct Pegel {
    source: Arc<dyn HydroSource>,
}

impl std::fmt::Debug for Pegel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pegel")
            .field("source", &self.source.name())
            .finish()
    }
}

/// Builder for constructing a [`Pegel`] instance.
#[derive(Default)]
pub struct PegelBuilder {
    source: Option<Arc<dyn HydroSource>>,
}

impl PegelBuilder {
    /// Create an empty builder; a source must be registered before `build`.
    #[must_use]
    pub fn new() -> Self {
        Self { source: None }
    }

    /// Register the hydrology source queries are routed to.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn HydroSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the instance.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no source has been registered.
    pub fn build(self) -> Result<Pegel, PegelError> {
        let source = self.source.ok_or_else(|| {
            PegelError::invalid_arg("no source registered; add one via source(...)")
        })?;
        Ok(Pegel { source })
    }
}

/// Result of the full fetch → fill → regularize pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    /// The regularized, frequency-tagged series.
    pub series: RegularSeries,
    /// Per-run gap audit from the fill step.
    pub gaps: Vec<GapRecord>,
}

impl Pegel {
    /// Start building a new instance.
    #[must_use]
    pub fn builder() -> PegelBuilder {
        PegelBuilder::new()
    }

    /// Name of the configured source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Raw retrieval: execute the query against the configured source.
    ///
    /// # Errors
    /// Propagates the source's `Store` and `Data` errors unmodified.
    pub async fn fetch(&self, query: &HydroQuery) -> Result<Frame, PegelError> {
        self.source.query_hydro(query).await
    }

    /// Retrieval plus bounded-gap filling.
    ///
    /// # Errors
    /// Source errors as in [`fetch`](Self::fetch); `InvalidArg` when the
    /// result is empty or the fill options reference unknown columns.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, query, fill)))]
    pub async fn fetch_filled(
        &self,
        query: &HydroQuery,
        fill: &GapFill,
    ) -> Result<FillReport, PegelError> {
        let frame = self.fetch(query).await?;
        fill.fill(&frame)
    }

    /// The full pipeline: fetch, fill bounded gaps, regularize.
    ///
    /// The fill step runs on the raw frame; the regularizer then resolves
    /// the series frequency, preferring the frame's own evidence over
    /// `declared` (see [`to_series`]).
    ///
    /// # Errors
    /// Everything [`fetch_filled`](Self::fetch_filled) can return, plus
    /// `IrregularIndex` when no frequency can be resolved and `InvalidArg`
    /// when the frame still carries a location column (partition first for
    /// multi-location queries).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, query, fill)))]
    pub async fn fetch_series(
        &self,
        query: &HydroQuery,
        fill: &GapFill,
        declared: Option<Every>,
    ) -> Result<SeriesReport, PegelError> {
        let report = self.fetch_filled(query, fill).await?;
        let series = to_series(&report.frame, declared)?;
        Ok(SeriesReport {
            series,
            gaps: report.gaps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_a_source_is_rejected() {
        let err = Pegel::builder().build().unwrap_err();
        assert!(matches!(err, PegelError::InvalidArg(_)), "{err}");
    }
}
