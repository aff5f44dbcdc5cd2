//! Strict sampling-frequency inference for time axes.
//!
//! The regularizer must never guess: an axis either has one exact spacing or
//! it has no inferable frequency at all. This is deliberately stricter than
//! mode-based step estimation, which would happily smooth over missing rows.

use std::ops::Sub;

use chrono::TimeDelta;

use crate::every::Every;

/// Minimum number of timestamps required before a frequency is inferred.
pub const MIN_INFER_POINTS: usize = 3;

/// Infer the sampling interval of a time axis.
///
/// Returns `Some` only when the axis has at least [`MIN_INFER_POINTS`]
/// timestamps and every adjacent pair is exactly the same positive,
/// whole-second distance apart. Duplicated timestamps, mixed spacings, and
/// sub-second steps all yield `None`.
///
/// Works on both `DateTime<Utc>` and `NaiveDateTime` axes:
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pegel_core::{infer_every, Every};
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
/// let axis: Vec<_> = (0..4).map(|i| start + Every::HOUR.to_delta() * i).collect();
/// assert_eq!(infer_every(&axis), Some(Every::HOUR));
///
/// let two = &axis[..2];
/// assert_eq!(infer_every(two), None); // too few points to commit
/// ```
#[must_use]
pub fn infer_every<T>(index: &[T]) -> Option<Every>
where
    T: Copy + Sub<Output = TimeDelta>,
{
    if index.len() < MIN_INFER_POINTS {
        return None;
    }
    let mut deltas = index.windows(2).map(|w| w[1] - w[0]);
    let first = deltas.next()?;
    if !deltas.all(|d| d == first) {
        return None;
    }
    step_to_every(first)
}

/// Check that every adjacent pair of timestamps is exactly `every` apart.
///
/// Vacuously true for axes with fewer than two timestamps.
#[must_use]
pub fn conforms_to<T>(index: &[T], every: Every) -> bool
where
    T: Copy + Sub<Output = TimeDelta>,
{
    let step = every.to_delta();
    index.windows(2).all(|w| w[1] - w[0] == step)
}

fn step_to_every(step: TimeDelta) -> Option<Every> {
    if step <= TimeDelta::zero() || step.subsec_nanos() != 0 {
        return None;
    }
    u32::try_from(step.num_seconds())
        .ok()
        .and_then(|secs| Every::seconds(secs).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn axis(step: Every, n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + step.to_delta() * i as i32).collect()
    }

    #[test]
    fn infers_exact_spacing() {
        let five_min = Every::minutes(5).unwrap();
        assert_eq!(infer_every(&axis(five_min, 10)), Some(five_min));
        assert_eq!(infer_every(&axis(Every::DAY, 3)), Some(Every::DAY));
    }

    #[test]
    fn too_few_points_is_ambiguous() {
        assert_eq!(infer_every(&axis(Every::HOUR, 0)), None);
        assert_eq!(infer_every(&axis(Every::HOUR, 2)), None);
    }

    #[test]
    fn mixed_spacing_is_rejected() {
        let mut ts = axis(Every::HOUR, 5);
        ts.remove(2);
        assert_eq!(infer_every(&ts), None);
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let mut ts = axis(Every::HOUR, 4);
        ts[1] = ts[0];
        assert_eq!(infer_every(&ts), None);
    }

    #[test]
    fn conformance_checks_each_pair() {
        let hourly = axis(Every::HOUR, 4);
        assert!(conforms_to(&hourly, Every::HOUR));
        assert!(!conforms_to(&hourly, Every::minutes(30).unwrap()));
        // Short axes conform vacuously.
        assert!(conforms_to(&hourly[..1], Every::HOUR));
        assert!(conforms_to::<DateTime<Utc>>(&[], Every::HOUR));
    }

    #[test]
    fn naive_axes_are_supported() {
        let naive: Vec<_> = axis(Every::HOUR, 4)
            .into_iter()
            .map(|t| t.naive_utc())
            .collect();
        assert_eq!(infer_every(&naive), Some(Every::HOUR));
        assert!(conforms_to(&naive, Every::HOUR));
    }
}
