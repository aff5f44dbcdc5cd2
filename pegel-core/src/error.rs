use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the pegel workspace.
///
/// This covers argument validation errors, irregular time axes that cannot be
/// given a frequency, data integrity issues in decoded payloads, and
/// store-tagged upstream failures.
///
/// Unfillable gaps are deliberately not represented here: a fill method that
/// cannot produce a value for an eligible cell is a degraded-but-successful
/// outcome, reported per run through
/// [`GapOutcome`](crate::timeseries::fill::GapOutcome).
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PegelError {
    /// Invalid input argument (unknown column, unknown method, empty frame,
    /// malformed duration, bad endpoint URL, ...).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A frequency could not be resolved for a time axis: spacing is
    /// irregular, too few points to infer, or a declared frequency
    /// contradicts the observed spacing.
    #[error("irregular time index: {0}")]
    IrregularIndex(String),

    /// Issues with returned or expected data (undecodable payloads, values
    /// of the wrong shape, ...).
    #[error("data issue: {0}")]
    Data(String),

    /// A named upstream store failed (transport error, non-success status).
    #[error("{store} failed: {msg}")]
    Store {
        /// Store name that failed.
        store: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl PegelError {
    /// Helper: build an `InvalidArg` error from a message.
    #[must_use]
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build an `IrregularIndex` error from a message.
    #[must_use]
    pub fn irregular_index(msg: impl Into<String>) -> Self {
        Self::IrregularIndex(msg.into())
    }

    /// Helper: build a `Data` error from a message.
    #[must_use]
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build a `Store` error with the store name and message.
    #[must_use]
    pub fn store(store: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Other` error from a message.
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns true when the error indicates bad caller input rather than an
    /// upstream or data condition.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArg(_) | Self::IrregularIndex(_))
    }
}

#[cfg(test)]
mod tests {
    use super::PegelError;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            PegelError::invalid_arg("unknown column 'flow'").to_string(),
            "invalid argument: unknown column 'flow'"
        );
        assert_eq!(
            PegelError::irregular_index("could not infer frequency from data").to_string(),
            "irregular time index: could not infer frequency from data"
        );
        assert_eq!(
            PegelError::store("existenz", "query returned 503").to_string(),
            "existenz failed: query returned 503"
        );
    }

    #[test]
    fn caller_error_classification() {
        assert!(PegelError::invalid_arg("x").is_caller_error());
        assert!(PegelError::irregular_index("x").is_caller_error());
        assert!(!PegelError::data("x").is_caller_error());
        assert!(!PegelError::store("existenz", "x").is_caller_error());
    }

    #[test]
    fn serde_round_trip() {
        let err = PegelError::store("existenz", "query returned 503");
        let json = serde_json::to_string(&err).unwrap();
        let back: PegelError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
