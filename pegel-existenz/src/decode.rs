//! Decoding of InfluxDB annotated CSV into frames.
//!
//! The query API answers with CSV carrying `#`-prefixed annotation records
//! and a leading unnamed annotation column. Header records can repeat when
//! the response spans several result tables, so decoding is driven by the
//! most recent header, and all rows are merged and sorted into one frame.

use chrono::{DateTime, Utc};
use pegel_core::{Column, Frame, LOCATION_COLUMN, PegelError, TIME_COLUMN};

/// Columns the endpoint returns for bookkeeping, never data.
fn is_bookkeeping(name: &str) -> bool {
    name.is_empty() || name == "result" || name == "table" || name == TIME_COLUMN
}

pub(crate) fn decode_frame(body: &str) -> Result<Frame, PegelError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut names: Vec<String> = Vec::new();
    let mut rows: Vec<(DateTime<Utc>, Vec<(String, String)>)> = Vec::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| PegelError::data(format!("undecodable CSV payload: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.get(0).is_some_and(|f| f.starts_with('#')) {
            continue;
        }
        if record.iter().any(|f| f == TIME_COLUMN) {
            let cols: Vec<String> = record.iter().map(str::to_owned).collect();
            for name in &cols {
                if !is_bookkeeping(name) && !names.contains(name) {
                    names.push(name.clone());
                }
            }
            header = Some(cols);
            continue;
        }

        let Some(header) = &header else {
            return Err(PegelError::data("data record before any header record"));
        };
        let mut ts = None;
        let mut cells = Vec::new();
        for (name, value) in header.iter().zip(record.iter()) {
            if name == TIME_COLUMN {
                let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
                    PegelError::data(format!("invalid {TIME_COLUMN} value '{value}': {e}"))
                })?;
                ts = Some(parsed.with_timezone(&Utc));
            } else if !is_bookkeeping(name) {
                cells.push((name.clone(), value.to_owned()));
            }
        }
        let ts =
            ts.ok_or_else(|| PegelError::data(format!("record without a {TIME_COLUMN} cell")))?;
        rows.push((ts, cells));
    }

    // Tables arrive one after the other; a single monotonic index needs a
    // stable sort across all of them.
    rows.sort_by_key(|(ts, _)| *ts);

    let index: Vec<DateTime<Utc>> = rows.iter().map(|(ts, _)| *ts).collect();
    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let raw = rows.iter().map(|(_, cells)| {
            cells
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        });
        if name == LOCATION_COLUMN {
            columns.push(Column::text(
                name,
                raw.map(|v| v.unwrap_or("").to_owned()).collect(),
            ));
        } else {
            let cells = raw
                .map(|v| parse_float_cell(name, v))
                .collect::<Result<Vec<_>, _>>()?;
            columns.push(Column::float(name, cells));
        }
    }

    Frame::new(index, columns)
}

fn parse_float_cell(name: &str, value: Option<&str>) -> Result<Option<f64>, PegelError> {
    match value {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
            PegelError::data(format!("column '{name}' has non-numeric cell '{raw}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SINGLE_TABLE: &str = "\
#group,false,false,true,false,false\n\
#datatype,string,long,dateTime:RFC3339,string,double\n\
#default,_result,,,,\n\
,result,table,_time,loc,temperature\n\
,_result,0,2024-05-01T00:00:00Z,2030,12.5\n\
,_result,0,2024-05-01T01:00:00Z,2030,\n\
,_result,0,2024-05-01T02:00:00Z,2030,13.1\n";

    #[test]
    fn decodes_annotated_single_table() {
        let frame = decode_frame(SINGLE_TABLE).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(
            frame.column_names().collect::<Vec<_>>(),
            vec![LOCATION_COLUMN, "temperature"]
        );
        assert_eq!(
            frame.float_column("temperature").unwrap(),
            &[Some(12.5), None, Some(13.1)]
        );
        assert_eq!(
            frame.timestamps()[0],
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            frame.column(LOCATION_COLUMN).unwrap().as_text().unwrap()[2],
            "2030"
        );
    }

    #[test]
    fn merges_tables_and_sorts_by_time() {
        let body = "\
,result,table,_time,loc,temperature\n\
,_result,0,2024-05-01T01:00:00Z,2030,12.0\n\
,_result,0,2024-05-01T00:00:00Z,2030,11.0\n\
\n\
,result,table,_time,loc,temperature\n\
,_result,1,2024-05-01T00:00:00Z,2135,9.5\n\
,_result,1,2024-05-01T01:00:00Z,2135,9.7\n";
        let frame = decode_frame(body).unwrap();
        assert_eq!(frame.len(), 4);
        let ts = frame.timestamps();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
        // Same-timestamp rows keep arrival order: table 0 before table 1.
        assert_eq!(
            frame.column(LOCATION_COLUMN).unwrap().as_text().unwrap(),
            &["2030".to_owned(), "2135".into(), "2030".into(), "2135".into()]
        );
        assert_eq!(
            frame.float_column("temperature").unwrap(),
            &[Some(11.0), Some(9.5), Some(12.0), Some(9.7)]
        );
    }

    #[test]
    fn empty_body_is_an_empty_frame() {
        let frame = decode_frame("").unwrap();
        assert!(frame.is_empty());
        assert!(frame.columns().is_empty());

        // Annotations with no data rows decode the same way.
        let frame = decode_frame("#datatype,string\n\n").unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn data_before_header_is_a_data_error() {
        let err = decode_frame(",_result,0,2024-05-01T00:00:00Z,2030,12.5\n").unwrap_err();
        assert!(matches!(err, PegelError::Data(_)), "{err}");
    }

    #[test]
    fn bad_timestamp_and_bad_number_are_data_errors() {
        let bad_time = "\
,result,table,_time,temperature\n\
,_result,0,yesterday,12.5\n";
        assert!(matches!(
            decode_frame(bad_time).unwrap_err(),
            PegelError::Data(_)
        ));

        let bad_number = "\
,result,table,_time,temperature\n\
,_result,0,2024-05-01T00:00:00Z,warm\n";
        let err = decode_frame(bad_number).unwrap_err();
        assert!(err.to_string().contains("non-numeric"), "{err}");
    }

    #[test]
    fn offset_timestamps_normalize_to_utc() {
        let body = "\
,result,table,_time,temperature\n\
,_result,0,2024-05-01T02:00:00+02:00,12.5\n";
        let frame = decode_frame(body).unwrap();
        assert_eq!(
            frame.timestamps()[0],
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
    }
}
