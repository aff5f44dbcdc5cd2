//! Fetch a week of observations from the mock source, fill short gaps, and
//! regularize into a series. Swap `MockSource` for `ExistenzStore::new()?`
//! to run against the live endpoint.

use std::sync::Arc;

use pegel::{Every, GapFill, HydroQuery, Pegel, Period};
use pegel_mock::MockSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let pegel = Pegel::builder()
        .source(Arc::new(MockSource::new()))
        .build()?;

    let query = HydroQuery::builder()
        .period(Period::last(Every::days(7)?))
        .location("2030")
        .fields(["temperature", "flow"])
        .build()?;

    let report = pegel
        .fetch_series(&query, &GapFill::new(2).mark_filled(true), None)
        .await?;

    println!(
        "{} rows from {} to {} at {}",
        report.series.len(),
        report.series.start(),
        report.series.end(),
        report.series.freq()
    );
    for gap in &report.gaps {
        println!(
            "gap in {} at row {} (len {}): {:?}",
            gap.column, gap.start, gap.len, gap.outcome
        );
    }

    Ok(())
}
