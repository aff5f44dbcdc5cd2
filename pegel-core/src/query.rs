use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PegelError;
use crate::every::Every;

/// One endpoint of a query period: a point in the past relative to "now",
/// an absolute instant, or now itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBound {
    /// `interval` before the time the query executes.
    Ago(Every),
    /// An absolute instant.
    At(DateTime<Utc>),
    /// The time the query executes.
    Now,
}

/// A half-open query period from `start` to `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: TimeBound,
    stop: TimeBound,
}

impl Period {
    /// Period between two explicit bounds.
    #[must_use]
    pub const fn new(start: TimeBound, stop: TimeBound) -> Self {
        Self { start, stop }
    }

    /// The trailing window ending now, e.g. `Period::last(Every::DAY)` for
    /// the most recent 24 hours.
    #[must_use]
    pub const fn last(window: Every) -> Self {
        Self {
            start: TimeBound::Ago(window),
            stop: TimeBound::Now,
        }
    }

    /// Period between two absolute instants.
    #[must_use]
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            start: TimeBound::At(from),
            stop: TimeBound::At(to),
        }
    }

    /// Start bound.
    #[must_use]
    pub const fn start(&self) -> TimeBound {
        self.start
    }

    /// Stop bound.
    #[must_use]
    pub const fn stop(&self) -> TimeBound {
        self.stop
    }
}

/// Window aggregation function applied by the store before returning rows.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    /// Arithmetic mean of the window.
    #[default]
    Mean,
    /// Median of the window.
    Median,
    /// Smallest value in the window.
    Min,
    /// Largest value in the window.
    Max,
    /// First value in the window.
    First,
    /// Last value in the window.
    Last,
    /// Sum of the window.
    Sum,
    /// Number of values in the window.
    Count,
}

impl AggregateFn {
    /// Canonical function name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Last => "last",
            Self::Sum => "sum",
            Self::Count => "count",
        }
    }
}

impl std::fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hydrology query against a [`HydroSource`](crate::source::HydroSource).
///
/// Selects one or more station locations and measurement fields over a
/// period, windowed and aggregated by the store. Defaults mirror the public
/// endpoint's conventions: field `temperature`, hourly mean windows, no
/// empty windows, and the location column dropped when only one location
/// was asked for.
///
/// ```
/// use pegel_core::{Every, HydroQuery, Period};
///
/// let query = HydroQuery::builder()
///     .period(Period::last(Every::days(7).unwrap()))
///     .location("2030")
///     .fields(["temperature", "flow"])
///     .window(Every::minutes(15).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(query.fields(), ["temperature", "flow"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydroQuery {
    period: Period,
    locations: Vec<String>,
    fields: Vec<String>,
    window: Every,
    function: AggregateFn,
    create_empty: bool,
    keep_location: bool,
}

impl HydroQuery {
    /// Start building a query.
    #[must_use]
    pub fn builder() -> HydroQueryBuilder {
        HydroQueryBuilder::default()
    }

    /// The query period.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Requested station locations.
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Requested measurement fields.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Aggregation window size.
    #[must_use]
    pub const fn window(&self) -> Every {
        self.window
    }

    /// Aggregation function.
    #[must_use]
    pub const fn function(&self) -> AggregateFn {
        self.function
    }

    /// Whether windows without observations are materialized as absent rows.
    #[must_use]
    pub const fn create_empty(&self) -> bool {
        self.create_empty
    }

    /// Whether the location column is kept even for single-location queries.
    #[must_use]
    pub const fn keep_location(&self) -> bool {
        self.keep_location
    }
}

/// Builder for [`HydroQuery`]; validation happens in
/// [`HydroQueryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct HydroQueryBuilder {
    period: Option<Period>,
    locations: Vec<String>,
    fields: Option<Vec<String>>,
    window: Option<Every>,
    function: AggregateFn,
    create_empty: bool,
    keep_location: bool,
}

impl HydroQueryBuilder {
    /// Set the query period.
    #[must_use]
    pub const fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Add one station location.
    #[must_use]
    pub fn location(mut self, loc: impl Into<String>) -> Self {
        self.locations.push(loc.into());
        self
    }

    /// Add several station locations.
    #[must_use]
    pub fn locations<I, S>(mut self, locs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations.extend(locs.into_iter().map(Into::into));
        self
    }

    /// Add one measurement field.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.get_or_insert_with(Vec::new).push(field.into());
        self
    }

    /// Replace the measurement fields.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the aggregation window (defaults to one hour).
    #[must_use]
    pub const fn window(mut self, window: Every) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the aggregation function (defaults to mean).
    #[must_use]
    pub const fn function(mut self, function: AggregateFn) -> Self {
        self.function = function;
        self
    }

    /// Materialize windows without observations as absent rows.
    #[must_use]
    pub const fn create_empty(mut self, create: bool) -> Self {
        self.create_empty = create;
        self
    }

    /// Keep the location column even when only one location is requested.
    #[must_use]
    pub const fn keep_location(mut self, keep: bool) -> Self {
        self.keep_location = keep;
        self
    }

    /// Validate and build the query.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no period was set, no location was added,
    /// or an explicitly provided field list is empty.
    pub fn build(self) -> Result<HydroQuery, PegelError> {
        let period = self
            .period
            .ok_or_else(|| PegelError::invalid_arg("query period is required"))?;
        if self.locations.is_empty() {
            return Err(PegelError::invalid_arg("at least one location is required"));
        }
        let fields = match self.fields {
            Some(fields) if fields.is_empty() => {
                return Err(PegelError::invalid_arg("at least one field is required"));
            }
            Some(fields) => fields,
            None => vec!["temperature".to_owned()],
        };
        Ok(HydroQuery {
            period,
            locations: self.locations,
            fields,
            window: self.window.unwrap_or(Every::HOUR),
            function: self.function,
            create_empty: self.create_empty,
            keep_location: self.keep_location,
        })
    }
}
