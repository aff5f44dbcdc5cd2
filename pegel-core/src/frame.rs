use chrono::{DateTime, Utc};

use crate::error::PegelError;
use crate::every::Every;
use crate::timeseries::infer::conforms_to;

/// Name of the timestamp column produced by the remote stores. It becomes the
/// frame index at the decoding boundary and never appears as a data column.
pub const TIME_COLUMN: &str = "_time";

/// Name of the location tag column produced by the remote stores.
pub const LOCATION_COLUMN: &str = "loc";

/// Suffix of the indicator columns emitted by bounded filling.
pub const FILLED_SUFFIX: &str = "_filled";

/// Cell payload of a single named column.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Measurements; `None` marks an absent observation.
    Float(Vec<Option<f64>>),
    /// Indicator cells, never absent.
    Bool(Vec<bool>),
    /// Tag cells such as station identifiers, never absent.
    Text(Vec<String>),
}

impl Values {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// True when the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column aligned to a frame's time index.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Values,
}

impl Column {
    /// Build a measurement column; `None` cells are absent observations.
    pub fn float(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: Values::Float(cells),
        }
    }

    /// Build an indicator column.
    pub fn flags(name: impl Into<String>, cells: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            values: Values::Bool(cells),
        }
    }

    /// Build a tag column.
    pub fn text(name: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: Values::Text(cells),
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell payload.
    #[must_use]
    pub const fn values(&self) -> &Values {
        &self.values
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Measurement cells, when this is a float column.
    #[must_use]
    pub fn as_float(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            Values::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Indicator cells, when this is a bool column.
    #[must_use]
    pub fn as_flags(&self) -> Option<&[bool]> {
        match &self.values {
            Values::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Tag cells, when this is a text column.
    #[must_use]
    pub fn as_text(&self) -> Option<&[String]> {
        match &self.values {
            Values::Text(v) => Some(v),
            _ => None,
        }
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        let values = match &self.values {
            Values::Float(v) => Values::Float(rows.iter().map(|&i| v[i]).collect()),
            Values::Bool(v) => Values::Bool(rows.iter().map(|&i| v[i]).collect()),
            Values::Text(v) => Values::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        };
        Self {
            name: self.name.clone(),
            values,
        }
    }
}

/// A time-indexed observation table.
///
/// Rows are keyed by a monotonically non-decreasing `DateTime<Utc>` index;
/// columns are named and aligned to it. An optional frequency tag records
/// that the index is known to be regular; the tag is validated when attached
/// and the frame is immutable afterwards, so a tagged frame can be trusted
/// downstream.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pegel_core::Frame;
///
/// let frame = Frame::builder()
///     .timestamps((0..4).map(|h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()))
///     .float("temperature", vec![Some(11.2), None, Some(12.0), Some(12.4)])
///     .build()
///     .unwrap();
///
/// assert_eq!(frame.len(), 4);
/// assert_eq!(frame.float_column("temperature").unwrap()[1], None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
    freq: Option<Every>,
}

impl Frame {
    /// Build a frame from an index and columns, validating alignment.
    ///
    /// # Errors
    /// Returns `InvalidArg` when a column's length differs from the index,
    /// when column names are empty or duplicated, or when the index is not
    /// monotonically non-decreasing.
    pub fn new(index: Vec<DateTime<Utc>>, columns: Vec<Column>) -> Result<Self, PegelError> {
        if !index.windows(2).all(|w| w[0] <= w[1]) {
            return Err(PegelError::invalid_arg(
                "time index must be monotonically non-decreasing",
            ));
        }
        for (i, col) in columns.iter().enumerate() {
            if col.name().is_empty() {
                return Err(PegelError::invalid_arg("column name cannot be empty"));
            }
            if col.len() != index.len() {
                return Err(PegelError::invalid_arg(format!(
                    "column '{}' has {} cells but the index has {} timestamps",
                    col.name(),
                    col.len(),
                    index.len()
                )));
            }
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(PegelError::invalid_arg(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }
        Ok(Self {
            index,
            columns,
            freq: None,
        })
    }

    /// Start building a frame.
    #[must_use]
    pub fn builder() -> FrameBuilder {
        FrameBuilder::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The time index.
    #[must_use]
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// All columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a float column's cells by name.
    #[must_use]
    pub fn float_column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_float)
    }

    /// The frequency tag, when one has been attached.
    #[must_use]
    pub const fn freq(&self) -> Option<Every> {
        self.freq
    }

    /// Attach a frequency tag after validating that the index conforms.
    ///
    /// # Errors
    /// Returns `IrregularIndex` when any adjacent pair of timestamps is not
    /// exactly `every` apart.
    pub fn with_freq(mut self, every: Every) -> Result<Self, PegelError> {
        if !conforms_to(&self.index, every) {
            return Err(PegelError::irregular_index(format!(
                "index does not conform to frequency '{every}'"
            )));
        }
        self.freq = Some(every);
        Ok(self)
    }

    /// Carry an already-validated tag onto a frame whose index is unchanged.
    pub(crate) fn carrying_freq(mut self, freq: Option<Every>) -> Self {
        self.freq = freq;
        self
    }

    /// Rows with `from <= t < to`, preserving columns and any frequency tag
    /// (a contiguous slice of a regular index stays regular).
    #[must_use]
    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        let lo = self.index.partition_point(|t| *t < from);
        let hi = self.index.partition_point(|t| *t < to);
        let rows: Vec<usize> = (lo..hi).collect();
        let mut out = self.take_rows(&rows);
        out.freq = self.freq;
        out
    }

    /// Split a multi-location frame into per-location frames, keyed by
    /// location in order of first appearance. The location column itself is
    /// removed from the parts and any frequency tag is dropped, since each
    /// part has its own spacing.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the frame has no text location column.
    pub fn partition_by_location(&self) -> Result<Vec<(String, Frame)>, PegelError> {
        let locs = self
            .column(LOCATION_COLUMN)
            .and_then(Column::as_text)
            .ok_or_else(|| {
                PegelError::invalid_arg(format!(
                    "no '{LOCATION_COLUMN}' text column to partition by"
                ))
            })?;

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (row, loc) in locs.iter().enumerate() {
            match groups.iter_mut().find(|(name, _)| name == loc) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((loc.clone(), vec![row])),
            }
        }

        Ok(groups
            .into_iter()
            .map(|(loc, rows)| {
                let mut part = self.take_rows(&rows);
                part.columns.retain(|c| c.name() != LOCATION_COLUMN);
                (loc, part)
            })
            .collect())
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: self.columns.iter().map(|c| c.take_rows(rows)).collect(),
            freq: None,
        }
    }
}

/// Builder for [`Frame`]; validation happens in [`FrameBuilder::build`].
#[derive(Debug, Default)]
pub struct FrameBuilder {
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl FrameBuilder {
    /// Set the time index.
    #[must_use]
    pub fn timestamps(mut self, index: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        self.index = index.into_iter().collect();
        self
    }

    /// Append a measurement column.
    #[must_use]
    pub fn float(mut self, name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        self.columns.push(Column::float(name, cells));
        self
    }

    /// Append an indicator column.
    #[must_use]
    pub fn flags(mut self, name: impl Into<String>, cells: Vec<bool>) -> Self {
        self.columns.push(Column::flags(name, cells));
        self
    }

    /// Append a tag column.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, cells: Vec<String>) -> Self {
        self.columns.push(Column::text(name, cells));
        self
    }

    /// Append an already-built column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Validate and build the frame.
    ///
    /// # Errors
    /// Same conditions as [`Frame::new`].
    pub fn build(self) -> Result<Frame, PegelError> {
        Frame::new(self.index, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|h| Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Every::HOUR.to_delta() * h as i32)
            .collect()
    }

    #[test]
    fn new_rejects_misaligned_columns() {
        let err = Frame::new(
            hourly(3),
            vec![Column::float("temperature", vec![Some(1.0), None])],
        )
        .unwrap_err();
        assert!(matches!(err, PegelError::InvalidArg(_)), "{err}");
    }

    #[test]
    fn new_rejects_unsorted_index() {
        let mut index = hourly(3);
        index.swap(0, 2);
        let err = Frame::new(index, vec![]).unwrap_err();
        assert!(err.to_string().contains("non-decreasing"), "{err}");
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Frame::new(
            hourly(1),
            vec![
                Column::float("temperature", vec![Some(1.0)]),
                Column::float("temperature", vec![Some(2.0)]),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn duplicate_timestamps_are_tolerated() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let frame = Frame::new(vec![ts, ts], vec![]).unwrap();
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn with_freq_validates_spacing() {
        let frame = Frame::builder()
            .timestamps(hourly(4))
            .float("stage", vec![Some(1.0); 4])
            .build()
            .unwrap();
        let tagged = frame.clone().with_freq(Every::HOUR).unwrap();
        assert_eq!(tagged.freq(), Some(Every::HOUR));

        let err = frame.with_freq(Every::minutes(30).unwrap()).unwrap_err();
        assert!(matches!(err, PegelError::IrregularIndex(_)), "{err}");
    }

    #[test]
    fn between_is_half_open_and_keeps_tag() {
        let index = hourly(5);
        let frame = Frame::builder()
            .timestamps(index.clone())
            .float("stage", vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .build()
            .unwrap()
            .with_freq(Every::HOUR)
            .unwrap();

        let sliced = frame.between(index[1], index[3]);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.timestamps(), &index[1..3]);
        assert_eq!(
            sliced.float_column("stage").unwrap(),
            &[Some(1.0), Some(2.0)]
        );
        assert_eq!(sliced.freq(), Some(Every::HOUR));
    }

    #[test]
    fn partition_by_location_splits_and_drops_tag_column() {
        let ts = hourly(2);
        let frame = Frame::builder()
            .timestamps(vec![ts[0], ts[0], ts[1], ts[1]])
            .text(
                LOCATION_COLUMN,
                vec!["2030".into(), "2135".into(), "2030".into(), "2135".into()],
            )
            .float("temperature", vec![Some(10.0), Some(9.0), Some(11.0), None])
            .build()
            .unwrap();

        let parts = frame.partition_by_location().unwrap();
        assert_eq!(parts.len(), 2);

        let (ref first_loc, ref first) = parts[0];
        assert_eq!(first_loc, "2030");
        assert_eq!(first.len(), 2);
        assert!(first.column(LOCATION_COLUMN).is_none());
        assert_eq!(
            first.float_column("temperature").unwrap(),
            &[Some(10.0), Some(11.0)]
        );

        let (ref second_loc, ref second) = parts[1];
        assert_eq!(second_loc, "2135");
        assert_eq!(
            second.float_column("temperature").unwrap(),
            &[Some(9.0), None]
        );
    }

    #[test]
    fn partition_requires_location_column() {
        let frame = Frame::builder()
            .timestamps(hourly(1))
            .float("temperature", vec![Some(1.0)])
            .build()
            .unwrap();
        assert!(frame.partition_by_location().is_err());
    }
}
