use async_trait::async_trait;

use crate::error::PegelError;
use crate::frame::Frame;
use crate::query::HydroQuery;

/// A supplier of raw hydrology observation frames.
///
/// Implemented by the remote Existenz store and by in-memory test sources.
/// Implementations are expected to honor the whole query contract: field and
/// location selection, window aggregation, and the location-column rule
/// (drop `loc` when exactly one location was requested and
/// `keep_location` is off).
#[async_trait]
pub trait HydroSource: Send + Sync {
    /// Stable identifier used in diagnostics and store-tagged errors.
    fn name(&self) -> &'static str;

    /// Execute a hydrology query and decode the result into a frame.
    ///
    /// An empty result is a valid empty frame, not an error; transport and
    /// decoding failures surface as `Store` and `Data` errors.
    async fn query_hydro(&self, query: &HydroQuery) -> Result<Frame, PegelError>;
}
