//! Conversion of frames into strictly regular, timezone-naive series.

use chrono::NaiveDateTime;

use crate::error::PegelError;
use crate::every::Every;
use crate::frame::{Frame, Values};
use crate::timeseries::infer::{conforms_to, infer_every};

/// A strictly regular, timezone-naive multi-column series.
///
/// The time axis is derived from `(start, freq, len)` rather than stored, so
/// a `RegularSeries` cannot contain index gaps or mixed spacing. Cells are
/// still optional: a gap that was too long to fill legitimately survives
/// regularization as a stretch of absent values.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularSeries {
    start: NaiveDateTime,
    freq: Every,
    len: usize,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl RegularSeries {
    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when the series has no rows. Never the case for series produced
    /// by [`to_series`], which rejects empty frames.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First timestamp.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last timestamp.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.start + self.freq.to_delta() * (self.len - 1) as i32
    }

    /// The declared sampling frequency.
    #[must_use]
    pub const fn freq(&self) -> Every {
        self.freq
    }

    /// The materialized time axis.
    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        let step = self.freq.to_delta();
        (0..self.len).map(move |i| self.start + step * i as i32)
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a column's cells by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cells)| cells.as_slice())
    }

    /// All columns with their cells.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .map(|(name, cells)| (name.as_str(), cells.as_slice()))
    }
}

/// Convert a frame into a [`RegularSeries`], resolving its frequency.
///
/// The time axis is made timezone-naive by dropping the UTC tag without
/// conversion; observations are assumed to be in one consistent timezone
/// already and only the annotation is removed.
///
/// Frequency resolution, in order:
///
/// 1. a frequency tag already on the frame wins; if `declared` disagrees
///    with it, a warning is emitted and the tag is kept,
/// 2. otherwise `declared` is validated against the actual spacing,
/// 3. otherwise the frequency is inferred, which requires at least three
///    timestamps and perfectly uniform spacing.
///
/// Float columns carry over unchanged, indicator columns widen to
/// `0.0`/`1.0`, text columns are rejected.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pegel_core::{to_series, Every, Frame};
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
/// let frame = Frame::builder()
///     .timestamps((0..4).map(|i| start + Every::HOUR.to_delta() * i))
///     .float("temperature", vec![Some(11.0), Some(11.5), None, Some(12.0)])
///     .build()
///     .unwrap();
///
/// let series = to_series(&frame, None).unwrap();
/// assert_eq!(series.freq(), Every::HOUR);
/// assert_eq!(series.column("temperature").unwrap()[2], None);
/// ```
///
/// # Errors
/// Returns `InvalidArg` for an empty frame, a frame without value columns,
/// or a frame still carrying a text column. Returns `IrregularIndex` when no
/// frequency can be resolved for the axis.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip(frame), fields(rows = frame.len()))
)]
pub fn to_series(frame: &Frame, declared: Option<Every>) -> Result<RegularSeries, PegelError> {
    if frame.is_empty() {
        return Err(PegelError::invalid_arg("cannot regularize an empty frame"));
    }

    let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::with_capacity(frame.columns().len());
    for col in frame.columns() {
        let cells = match col.values() {
            Values::Float(cells) => cells.clone(),
            Values::Bool(cells) => cells
                .iter()
                .map(|&b| Some(if b { 1.0 } else { 0.0 }))
                .collect(),
            Values::Text(_) => {
                return Err(PegelError::invalid_arg(format!(
                    "text column '{}' cannot enter a regular series; partition by location first",
                    col.name()
                )));
            }
        };
        columns.push((col.name().to_owned(), cells));
    }
    if columns.is_empty() {
        return Err(PegelError::invalid_arg("frame has no value columns"));
    }

    let naive: Vec<NaiveDateTime> = frame.timestamps().iter().map(|t| t.naive_utc()).collect();

    let freq = match (frame.freq(), declared) {
        (Some(tag), Some(declared)) => {
            if declared != tag {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    %declared,
                    %tag,
                    "declared frequency disagrees with the frame's tag; keeping the tag"
                );
            }
            tag
        }
        (Some(tag), None) => tag,
        (None, Some(declared)) => {
            if !conforms_to(&naive, declared) {
                return Err(PegelError::irregular_index(format!(
                    "index does not conform to declared frequency '{declared}'"
                )));
            }
            declared
        }
        (None, None) => infer_every(&naive)
            .ok_or_else(|| PegelError::irregular_index("could not infer frequency from data"))?,
    };

    Ok(RegularSeries {
        start: naive[0],
        freq,
        len: naive.len(),
        columns,
    })
}
