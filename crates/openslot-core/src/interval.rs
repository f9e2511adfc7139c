//! Time intervals for the slot engine.
//!
//! All slot computation happens in one canonical IANA timezone per query,
//! so the interval type is built on [`DateTime<Tz>`] rather than UTC.
//! Intervals are half-open: `[start, end)`.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// A half-open time interval `[start, end)` in the working timezone.
///
/// Invariant: `start <= end`. Zero-length intervals are allowed but have
/// no free/busy effect; the merger drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    /// Start of the interval (inclusive).
    pub start: DateTime<Tz>,
    /// End of the interval (exclusive).
    pub end: DateTime<Tz>,
}

impl Interval {
    /// Creates a new interval.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`. Use [`Interval::from_endpoints`]
    /// for data coming from an external source.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        assert!(start <= end, "Interval start must be <= end");
        Self { start, end }
    }

    /// Creates an interval from possibly unordered endpoints.
    ///
    /// Adapter data with `start > end` is normalized by swapping the
    /// endpoints. This is the single place where malformed intervals are
    /// repaired; everything downstream can rely on the invariant.
    pub fn from_endpoints(a: DateTime<Tz>, b: DateTime<Tz>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Returns true if the interval is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the duration in whole minutes (seconds truncated).
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_seconds() / 60
    }

    /// Checks if two intervals overlap (shared time of nonzero length).
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Checks if two intervals overlap or touch at a boundary.
    ///
    /// Touching intervals are merged by the busy-time merger: a gap of
    /// zero length is never considered free.
    pub fn overlaps_or_touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Checks if an instant falls within the interval (`[start, end)`).
    pub fn contains(&self, instant: DateTime<Tz>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    fn at(h: u32, min: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(2025, 3, 3, h, min, 0).unwrap()
    }

    #[test]
    fn creation_and_duration() {
        let iv = Interval::new(at(9, 0), at(10, 30));
        assert_eq!(iv.duration_minutes(), 90);
        assert!(!iv.is_empty());
    }

    #[test]
    fn zero_length_is_empty() {
        let iv = Interval::new(at(9, 0), at(9, 0));
        assert!(iv.is_empty());
        assert_eq!(iv.duration_minutes(), 0);
    }

    #[test]
    #[should_panic(expected = "start must be <= end")]
    fn new_rejects_reversed_endpoints() {
        Interval::new(at(10, 0), at(9, 0));
    }

    #[test]
    fn from_endpoints_normalizes() {
        let iv = Interval::from_endpoints(at(10, 0), at(9, 0));
        assert_eq!(iv.start, at(9, 0));
        assert_eq!(iv.end, at(10, 0));

        let ordered = Interval::from_endpoints(at(9, 0), at(10, 0));
        assert_eq!(iv, ordered);
    }

    #[test]
    fn duration_truncates_to_whole_minutes() {
        let start = Berlin.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let end = Berlin.with_ymd_and_hms(2025, 3, 3, 9, 30, 59).unwrap();
        assert_eq!(Interval::new(start, end).duration_minutes(), 30);
    }

    #[test]
    fn overlap_checks() {
        let a = Interval::new(at(9, 0), at(10, 0));
        let b = Interval::new(at(9, 30), at(11, 0));
        let c = Interval::new(at(10, 0), at(11, 0));
        let d = Interval::new(at(11, 30), at(12, 0));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // touching is not overlapping
        assert!(a.overlaps_or_touches(&c));
        assert!(!a.overlaps_or_touches(&d));
    }

    #[test]
    fn contains_is_half_open() {
        let iv = Interval::new(at(9, 0), at(10, 0));
        assert!(iv.contains(at(9, 0)));
        assert!(iv.contains(at(9, 59)));
        assert!(!iv.contains(at(10, 0)));
    }
}
