//! Busy-time merging.
//!
//! Collapses an unsorted multiset of intervals (possibly from several
//! identities) into a minimal sorted, disjoint set. Touching intervals
//! (`a.end == b.start`) are combined: a gap of zero length is never free.

use crate::interval::Interval;

/// Merges overlapping and adjacent intervals into a disjoint set.
///
/// Zero-length intervals are dropped up front; left in place they would
/// split an otherwise contiguous free range at their position.
///
/// The result is sorted ascending by start and pairwise non-touching.
/// Empty input yields empty output. Intervals with identical starts merge
/// in encounter order; the outcome is order-independent since merging only
/// ever extends the end.
pub fn merge(intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
    let mut spans: Vec<Interval> = intervals.into_iter().filter(|iv| !iv.is_empty()).collect();
    spans.sort_by_key(|iv| iv.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(current) if span.start <= current.end => {
                if span.end > current.end {
                    current.end = span.end;
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Europe::Berlin;
    use chrono_tz::Tz;

    fn at(h: u32, min: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(2025, 3, 3, h, min, 0).unwrap()
    }

    fn iv(h1: u32, m1: u32, h2: u32, m2: u32) -> Interval {
        Interval::new(at(h1, m1), at(h2, m2))
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge(Vec::new()).is_empty());
    }

    #[test]
    fn disjoint_intervals_pass_through_sorted() {
        let merged = merge(vec![iv(13, 0, 14, 0), iv(9, 0, 10, 0)]);
        assert_eq!(merged, vec![iv(9, 0, 10, 0), iv(13, 0, 14, 0)]);
    }

    #[test]
    fn overlapping_intervals_merge() {
        // Scenario 2 from the worked examples: (10:00,10:30) + (10:15,11:00).
        let merged = merge(vec![iv(10, 0, 10, 30), iv(10, 15, 11, 0)]);
        assert_eq!(merged, vec![iv(10, 0, 11, 0)]);
    }

    #[test]
    fn touching_intervals_merge() {
        let merged = merge(vec![iv(10, 0, 11, 0), iv(11, 0, 12, 0)]);
        assert_eq!(merged, vec![iv(10, 0, 12, 0)]);
    }

    #[test]
    fn contained_interval_is_absorbed() {
        let merged = merge(vec![iv(9, 0, 12, 0), iv(10, 0, 11, 0)]);
        assert_eq!(merged, vec![iv(9, 0, 12, 0)]);
    }

    #[test]
    fn identical_starts_merge_regardless_of_order() {
        let a = merge(vec![iv(9, 0, 9, 30), iv(9, 0, 10, 0)]);
        let b = merge(vec![iv(9, 0, 10, 0), iv(9, 0, 9, 30)]);
        assert_eq!(a, b);
        assert_eq!(a, vec![iv(9, 0, 10, 0)]);
    }

    #[test]
    fn degenerate_intervals_are_dropped() {
        let merged = merge(vec![iv(12, 0, 12, 0), iv(9, 0, 10, 0)]);
        assert_eq!(merged, vec![iv(9, 0, 10, 0)]);
        assert!(merge(vec![iv(12, 0, 12, 0)]).is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let input = vec![
            iv(10, 0, 10, 30),
            iv(10, 15, 11, 0),
            iv(11, 0, 11, 30),
            iv(14, 0, 15, 0),
            iv(13, 59, 14, 1),
        ];
        let once = merge(input);
        let twice = merge(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn merged_output_is_disjoint_and_non_touching() {
        let merged = merge(vec![
            iv(9, 0, 9, 45),
            iv(9, 30, 10, 15),
            iv(10, 15, 10, 30),
            iv(12, 0, 13, 0),
            iv(16, 0, 17, 0),
            iv(15, 30, 16, 0),
        ]);
        for pair in merged.windows(2) {
            assert!(
                pair[0].end < pair[1].start,
                "expected strict gap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn merge_covers_exactly_the_input_union() {
        let input = vec![iv(9, 0, 10, 0), iv(9, 30, 11, 0), iv(13, 0, 14, 0)];
        let merged = merge(input.clone());

        // Every input instant is covered by the merged set, probing at
        // minute granularity.
        for orig in &input {
            let mut t = orig.start;
            while t < orig.end {
                assert!(merged.iter().any(|m| m.contains(t)), "lost coverage at {t}");
                t = t + chrono::Duration::minutes(1);
            }
        }
        // And nothing outside the input union is covered.
        for m in &merged {
            let mut t = m.start;
            while t < m.end {
                assert!(input.iter().any(|o| o.contains(t)), "gained coverage at {t}");
                t = t + chrono::Duration::minutes(1);
            }
        }
    }
}
