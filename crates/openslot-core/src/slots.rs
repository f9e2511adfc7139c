//! Free-slot scanning.
//!
//! Walks each day's working window against the merged busy set and emits
//! the maximal free sub-intervals that satisfy the minimum duration, up to
//! an optional result cap.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::busy::BusyInterval;
use crate::interval::Interval;
use crate::merge::merge;
use crate::window::{DayWindow, WorkingWindowConfig, WorkingWindows};

/// A maximal free time range within one working window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSlot {
    /// Start of the slot (inclusive).
    pub start: DateTime<Tz>,
    /// End of the slot (exclusive).
    pub end: DateTime<Tz>,
    /// Whole minutes between start and end (seconds truncated).
    pub duration_minutes: i64,
    /// The calendar date the slot falls on.
    pub date: NaiveDate,
    /// Full weekday name, e.g. "Monday".
    pub day: String,
}

/// Wire form of a [`FreeSlot`]: RFC 3339 instants with a fixed offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct FreeSlotView {
    /// Start as an RFC 3339 timestamp with offset.
    pub start: DateTime<FixedOffset>,
    /// End as an RFC 3339 timestamp with offset.
    pub end: DateTime<FixedOffset>,
    /// Whole minutes between start and end.
    pub duration_minutes: i64,
    /// The calendar date the slot falls on.
    pub date: NaiveDate,
    /// Full weekday name.
    pub day: String,
}

impl From<&FreeSlot> for FreeSlotView {
    fn from(slot: &FreeSlot) -> Self {
        Self {
            start: slot.start.fixed_offset(),
            end: slot.end.fixed_offset(),
            duration_minutes: slot.duration_minutes,
            date: slot.date,
            day: slot.day.clone(),
        }
    }
}

/// Scans working windows against a merged busy set.
///
/// `merged_busy` must be sorted and disjoint (the output of
/// [`merge`]); windows must arrive in date order. Both hold by
/// construction for the types in this crate, which is what makes the
/// output ordering guarantee (date ascending, then start ascending) fall
/// out of a single left-to-right pass.
///
/// A non-positive `min_duration` degenerates to "every gap qualifies";
/// validating the minimum is the caller's policy. When `limit` is reached
/// the scan stops immediately, across windows.
pub fn find_free_slots(
    merged_busy: &[Interval],
    windows: impl IntoIterator<Item = DayWindow>,
    min_duration: Duration,
    limit: Option<usize>,
) -> Vec<FreeSlot> {
    let mut slots = Vec::new();

    for window in windows {
        let mut cursor = window.start;

        for busy in merged_busy {
            // Busy time entirely before the cursor is already accounted for.
            if busy.end <= cursor {
                continue;
            }
            // The busy list is sorted: nothing later can affect this window.
            if busy.start >= window.end {
                break;
            }

            if busy.start > cursor {
                let end = busy.start.min(window.end);
                if end - cursor >= min_duration {
                    slots.push(free_slot(&window, cursor, end));
                    if limit.is_some_and(|l| slots.len() >= l) {
                        return slots;
                    }
                }
            }

            if busy.end > cursor {
                cursor = busy.end;
            }
        }

        if cursor < window.end && window.end - cursor >= min_duration {
            slots.push(free_slot(&window, cursor, window.end));
            if limit.is_some_and(|l| slots.len() >= l) {
                return slots;
            }
        }
    }

    slots
}

/// Computes free slots from raw busy intervals in one call.
///
/// Filters out non-occupying intervals (status `free`, zero length),
/// merges the rest, generates the working windows for the range, and
/// scans. Pure: same inputs, same output.
pub fn compute_free_slots(
    busy: &[BusyInterval],
    range_start: DateTime<Tz>,
    range_end: DateTime<Tz>,
    config: &WorkingWindowConfig,
    min_duration_minutes: i64,
    limit: Option<usize>,
) -> Vec<FreeSlot> {
    let occupied = busy.iter().filter(|b| b.occupies()).map(|b| b.interval);
    let merged = merge(occupied);
    let windows = WorkingWindows::new(range_start, range_end, config);
    find_free_slots(
        &merged,
        windows,
        Duration::minutes(min_duration_minutes),
        limit,
    )
}

fn free_slot(window: &DayWindow, start: DateTime<Tz>, end: DateTime<Tz>) -> FreeSlot {
    FreeSlot {
        start,
        end,
        duration_minutes: (end - start).num_seconds() / 60,
        date: window.date,
        day: window.date.format("%A").to_string(),
    }
}
