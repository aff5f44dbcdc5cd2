use chrono::{DateTime, Utc};
use pegel_core::{Every, Frame, GapFill, PegelError, to_series};
use proptest::prelude::*;

fn frame_with_step(step_secs: u32, cells: Vec<Option<f64>>) -> Frame {
    let start = DateTime::from_timestamp(1_714_521_600, 0).unwrap(); // 2024-05-01T00:00:00Z
    let step = Every::seconds(step_secs).unwrap().to_delta();
    let index: Vec<DateTime<Utc>> = (0..cells.len()).map(|i| start + step * i as i32).collect();
    Frame::builder()
        .timestamps(index)
        .float("temperature", cells)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn regular_axes_resolve_to_their_spacing(
        step_secs in 1u32..100_000,
        n in 3usize..50
    ) {
        let series = to_series(&frame_with_step(step_secs, vec![Some(1.0); n]), None).unwrap();
        prop_assert_eq!(series.freq().as_secs(), i64::from(step_secs));
        prop_assert_eq!(series.len(), n);
    }

    #[test]
    fn one_displaced_timestamp_breaks_inference(
        n in 4usize..50,
        displaced in 1usize..3
    ) {
        let frame = frame_with_step(3_600, vec![Some(1.0); n]);
        let mut index = frame.timestamps().to_vec();
        index[displaced] += Every::MINUTE.to_delta();
        let crooked = Frame::builder()
            .timestamps(index)
            .float("temperature", vec![Some(1.0); n])
            .build()
            .unwrap();

        let err = to_series(&crooked, None).unwrap_err();
        prop_assert!(matches!(err, PegelError::IrregularIndex(_)));
    }

    #[test]
    fn declared_frequency_never_overrides_the_evidence(
        step_secs in 1u32..10_000,
        n in 3usize..30
    ) {
        let frame = frame_with_step(step_secs, vec![Some(1.0); n]);
        // A matching declaration resolves, a disagreeing one errors.
        let series = to_series(&frame, Some(Every::seconds(step_secs).unwrap())).unwrap();
        prop_assert_eq!(series.freq().as_secs(), i64::from(step_secs));

        let wrong = Every::seconds(step_secs + 1).unwrap();
        prop_assert!(to_series(&frame, Some(wrong)).is_err());
    }
}

#[test]
fn fill_then_regularize_keeps_long_gaps_absent() {
    let frame = frame_with_step(
        3_600,
        vec![
            Some(1.0),
            None,
            None,
            Some(4.0),
            None,
            None,
            None,
            Some(8.0),
        ],
    );
    let report = GapFill::new(2).fill(&frame).unwrap();
    let series = to_series(&report.frame, None).unwrap();

    assert_eq!(series.freq(), Every::HOUR);
    assert_eq!(
        series.column("temperature").unwrap(),
        &[
            Some(1.0),
            Some(2.0),
            Some(3.0),
            Some(4.0),
            None,
            None,
            None,
            Some(8.0)
        ]
    );
    // The regular axis is derived, not stored, so the gap lives in the
    // cells and never in the index.
    assert_eq!(series.timestamps().count(), 8);
}

#[test]
fn tagged_frames_skip_inference_entirely() {
    // Two points cannot be inferred from, but a validated tag carries over.
    let frame = frame_with_step(900, vec![Some(1.0), Some(2.0)])
        .with_freq(Every::minutes(15).unwrap())
        .unwrap();
    let series = to_series(&frame, None).unwrap();
    assert_eq!(series.freq(), Every::minutes(15).unwrap());
}
