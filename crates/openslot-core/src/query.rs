//! Per-invocation query parameters.

use chrono::DateTime;
use chrono_tz::Tz;

/// Parameters of a single free-slot query.
///
/// Ephemeral: constructed per invocation from CLI/daemon input, passed to
/// the availability source and the slot engine, then discarded. Never
/// persisted, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The identities whose mutual availability is requested (1 or more).
    /// Order is preserved for the batched source call; the slot engine
    /// itself discards attribution.
    pub identities: Vec<String>,
    /// Start of the queried range.
    pub range_start: DateTime<Tz>,
    /// End of the queried range.
    pub range_end: DateTime<Tz>,
    /// Minimum slot duration in minutes.
    pub min_duration_minutes: i64,
    /// Optional cap on the number of returned slots.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a query for the given identities and range.
    pub fn new(
        identities: Vec<String>,
        range_start: DateTime<Tz>,
        range_end: DateTime<Tz>,
        min_duration_minutes: i64,
    ) -> Self {
        Self {
            identities,
            range_start,
            range_end,
            min_duration_minutes,
            limit: None,
        }
    }

    /// Builder method to cap the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn builder() {
        let start = Berlin.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let end = Berlin.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap();
        let query = Query::new(vec!["a@example.com".into()], start, end, 30).with_limit(5);

        assert_eq!(query.identities.len(), 1);
        assert_eq!(query.min_duration_minutes, 30);
        assert_eq!(query.limit, Some(5));
    }
}
