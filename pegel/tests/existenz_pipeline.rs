//! End-to-end: facade wired to the real connector against a mocked endpoint.

use std::sync::Arc;

use httpmock::prelude::*;
use pegel::{Every, GapFill, HydroQuery, Pegel, Period};
use pegel_existenz::ExistenzStore;

const BODY: &str = "\
#group,false,false,true,false,false\n\
#datatype,string,long,dateTime:RFC3339,string,double\n\
#default,_result,,,,\n\
,result,table,_time,loc,temperature\n\
,_result,0,2024-05-01T00:00:00Z,2030,11.0\n\
,_result,0,2024-05-01T01:00:00Z,2030,\n\
,_result,0,2024-05-01T02:00:00Z,2030,\n\
,_result,0,2024-05-01T03:00:00Z,2030,14.0\n\
,_result,0,2024-05-01T04:00:00Z,2030,\n\
,_result,0,2024-05-01T05:00:00Z,2030,\n\
,_result,0,2024-05-01T06:00:00Z,2030,\n\
,_result,0,2024-05-01T07:00:00Z,2030,18.0\n";

#[tokio::test]
async fn bounded_fill_over_the_wire_format() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/query");
            then.status(200)
                .header("Content-Type", "application/csv")
                .body(BODY);
        })
        .await;

    let pegel = Pegel::builder()
        .source(Arc::new(
            ExistenzStore::builder()
                .base_url(server.base_url())
                .build()
                .unwrap(),
        ))
        .build()
        .unwrap();

    let query = HydroQuery::builder()
        .period(Period::last(Every::DAY))
        .location("2030")
        .build()
        .unwrap();

    let report = pegel
        .fetch_series(&query, &GapFill::new(2), None)
        .await
        .unwrap();

    assert_eq!(report.series.freq(), Every::HOUR);
    // Two-cell gap interpolated, three-cell gap left absent.
    assert_eq!(
        report.series.column("temperature").unwrap(),
        &[
            Some(11.0),
            Some(12.0),
            Some(13.0),
            Some(14.0),
            None,
            None,
            None,
            Some(18.0)
        ]
    );
}
