//! Deterministic fixture traces.
//!
//! Values are a slow sine wave seeded by location and field names, with two
//! kinds of gaps punched in on a fixed cycle: a one-cell gap (short enough
//! for any reasonable fill limit) and a three-cell run (long enough to
//! survive a `limit = 2` fill untouched). The same query always produces the
//! same frame.

use std::f64::consts::TAU;

use chrono::{DateTime, TimeZone, Utc};
use pegel_core::{Frame, HydroQuery, LOCATION_COLUMN, PegelError};

const GAP_CYCLE: u64 = 24;
const SHORT_GAP_PHASE: u64 = 7;
const LONG_GAP_PHASES: std::ops::Range<u64> = 16..19;

fn trace_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
}

fn seed(s: &str) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
}

fn value(field: &str, loc: &str, i: usize) -> Option<f64> {
    let s = seed(loc).wrapping_add(seed(field));
    let phase = (i as u64).wrapping_add(s) % GAP_CYCLE;
    if phase == SHORT_GAP_PHASE || LONG_GAP_PHASES.contains(&phase) {
        return None;
    }
    let (base, amp) = match field {
        "temperature" => (12.0, 4.0),
        "flow" => (85.0, 30.0),
        "height" => (502.0, 0.6),
        _ => (50.0, 10.0),
    };
    let angle = (i as f64) / 48.0 * TAU + (s % 100) as f64;
    Some(base + amp * angle.sin())
}

pub(crate) fn frame_for(query: &HydroQuery, rows: usize) -> Result<Frame, PegelError> {
    let step = query.window().to_delta();
    let start = trace_start();
    let locs = query.locations();
    let with_loc = query.keep_location() || locs.len() > 1;

    let mut index = Vec::with_capacity(rows * locs.len());
    let mut loc_cells = Vec::with_capacity(rows * locs.len());
    for i in 0..rows {
        let ts = start + step * i as i32;
        for loc in locs {
            index.push(ts);
            loc_cells.push(loc.clone());
        }
    }

    let mut builder = Frame::builder().timestamps(index);
    if with_loc {
        builder = builder.text(LOCATION_COLUMN, loc_cells);
    }
    for field in query.fields() {
        let cells = (0..rows)
            .flat_map(|i| locs.iter().map(move |loc| value(field, loc, i)))
            .collect();
        builder = builder.float(field, cells);
    }
    builder.build()
}
