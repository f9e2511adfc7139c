//! Busy intervals as reported by an availability source.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// The free/busy status of a reported interval.
///
/// Availability sources report one status per interval. Only [`Free`]
/// leaves the time schedulable; every other status, including [`NoData`],
/// contributes to occupancy (no slots are offered where availability is
/// unknown).
///
/// [`Free`]: BusyStatus::Free
/// [`NoData`]: BusyStatus::NoData
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyStatus {
    /// The identity has a confirmed engagement.
    #[default]
    Busy,
    /// The identity has a tentatively accepted engagement.
    Tentative,
    /// The identity is out of office.
    OutOfOffice,
    /// The identity is working from another location.
    WorkingElsewhere,
    /// The interval is explicitly free.
    Free,
    /// The source has no availability data for the interval.
    NoData,
}

impl BusyStatus {
    /// Returns true if this status makes the interval count as occupied.
    pub fn occupies(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

/// A busy interval with optional detail, as returned by a source.
///
/// Subject and location are only present when the source exposes detailed
/// availability (e.g. the queried identity shares their calendar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    /// The occupied time range.
    pub interval: Interval,
    /// The reported status.
    pub status: BusyStatus,
    /// The engagement subject, if shared.
    pub subject: Option<String>,
    /// The engagement location, if shared.
    pub location: Option<String>,
}

impl BusyInterval {
    /// Creates a busy interval with the given status and no detail.
    pub fn new(interval: Interval, status: BusyStatus) -> Self {
        Self {
            interval,
            status,
            subject: None,
            location: None,
        }
    }

    /// Builder method to set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Returns true if this interval counts toward occupancy.
    pub fn occupies(&self) -> bool {
        self.status.occupies() && !self.interval.is_empty()
    }
}

/// Wire/display form of a busy interval (person agenda output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyIntervalView {
    /// Start as an RFC 3339 timestamp with offset.
    pub start: DateTime<FixedOffset>,
    /// End as an RFC 3339 timestamp with offset.
    pub end: DateTime<FixedOffset>,
    /// The reported status.
    pub status: BusyStatus,
    /// The engagement subject, if shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// The engagement location, if shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<&BusyInterval> for BusyIntervalView {
    fn from(busy: &BusyInterval) -> Self {
        Self {
            start: busy.interval.start.fixed_offset(),
            end: busy.interval.end.fixed_offset(),
            status: busy.status,
            subject: busy.subject.clone(),
            location: busy.location.clone(),
        }
    }
}
