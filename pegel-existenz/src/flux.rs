//! Flux query script assembly for the Existenz InfluxDB endpoint.
//!
//! The endpoint speaks the Flux query language over HTTP. The script here is
//! a fixed pipeline with the query's values spliced in; the only piece with a
//! contract of its own is [`chain_equality`], which turns a set of values into
//! a filter predicate.

use chrono::SecondsFormat;
use pegel_core::{HydroQuery, PegelError, TimeBound};

/// Build a Flux filter predicate testing `column` against one or more values
/// with equality, joined by `connective`.
///
/// `(r) => r["loc"] == "2030" or r["loc"] == "2135"` for two values. Using
/// `contains(...)` instead performs far worse on this endpoint, so chained
/// comparisons it is. `wrap_in_quotes` is off for numeric comparisons.
///
/// # Errors
/// Returns `InvalidArg` for zero values; there is no empty predicate.
pub fn chain_equality<S: AsRef<str>>(
    column: &str,
    values: &[S],
    connective: &str,
    wrap_in_quotes: bool,
) -> Result<String, PegelError> {
    if values.is_empty() {
        return Err(PegelError::invalid_arg(format!(
            "cannot equality-chain zero values for '{column}'"
        )));
    }
    let q = if wrap_in_quotes { "\"" } else { "" };
    let clauses: Vec<String> = values
        .iter()
        .map(|v| format!("r[\"{column}\"] == {q}{}{q}", v.as_ref()))
        .collect();
    Ok(format!(
        "(r) => {}",
        clauses.join(&format!(" {connective} "))
    ))
}

/// Render a period bound the way Flux `range()` expects it.
fn render_bound(bound: TimeBound) -> String {
    match bound {
        TimeBound::Ago(every) => format!("-{every}"),
        TimeBound::At(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
        TimeBound::Now => "now()".to_owned(),
    }
}

/// Assemble the full Flux script for a hydrology query against `bucket`.
///
/// The pipeline ranges, filters on measurement/field/location, windows and
/// aggregates, pivots fields into columns keyed by `_time`, and drops the
/// bookkeeping columns the pivot leaves behind.
///
/// # Errors
/// Returns `InvalidArg` when the query has no fields or locations (already
/// ruled out by the query builder, but a hand-rolled query could).
pub fn script(query: &HydroQuery, bucket: &str) -> Result<String, PegelError> {
    let measurement = chain_equality("_measurement", &["hydro"], "or", true)?;
    let fields = chain_equality("_field", query.fields(), "or", true)?;
    let locations = chain_equality("loc", query.locations(), "or", true)?;

    Ok(format!(
        "from(bucket: \"{bucket}\")\n\
         \x20 |> range(start: {start}, stop: {stop})\n\
         \x20 |> filter(fn: {measurement})\n\
         \x20 |> filter(fn: {fields})\n\
         \x20 |> filter(fn: {locations})\n\
         \x20 |> aggregateWindow(every: {window}, fn: {function}, createEmpty: {create_empty})\n\
         \x20 |> pivot(rowKey: [\"_time\"], columnKey: [\"_field\"], valueColumn: \"_value\")\n\
         \x20 |> drop(columns: [\"_start\", \"result\", \"_stop\", \"table\", \"_measurement\"])",
        start = render_bound(query.period().start()),
        stop = render_bound(query.period().stop()),
        window = query.window(),
        function = query.function(),
        create_empty = query.create_empty(),
    ))
}
