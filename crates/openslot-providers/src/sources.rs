//! AvailabilitySource implementations.
//!
//! Two sources back the slot engine:
//!
//! - [`ScheduleSource`] asks the backend's free/busy endpoint for one or
//!   more identities in a single batched call. This is the primary source
//!   for both own-account and multi-identity queries.
//! - [`CalendarViewSource`] reads the account's own calendar and maps its
//!   events to busy intervals. The daemon falls back to it when the
//!   schedule endpoint fails or reports nothing.

use std::sync::Arc;

use openslot_core::{BusyInterval, Interval};

use crate::error::SourceResult;
use crate::graph::GroupwareClient;
use crate::graph::schema::busy_interval_from_event;
use crate::source::{AvailabilitySource, BoxFuture};

/// Free/busy availability of one or more identities, batched.
#[derive(Debug, Clone)]
pub struct ScheduleSource {
    client: Arc<GroupwareClient>,
}

impl ScheduleSource {
    /// Creates a schedule source over the given client.
    pub fn new(client: Arc<GroupwareClient>) -> Self {
        Self { client }
    }
}

impl AvailabilitySource for ScheduleSource {
    fn name(&self) -> &str {
        "schedule"
    }

    fn get_busy_intervals(
        &self,
        identities: &[String],
        range: Interval,
        granularity_minutes: u32,
    ) -> BoxFuture<'_, SourceResult<Vec<BusyInterval>>> {
        let identities = identities.to_vec();
        Box::pin(async move {
            self.client
                .get_schedule(&identities, range, granularity_minutes)
                .await
        })
    }
}

/// The account's own calendar, viewed as busy intervals.
///
/// Identities are ignored: this source only ever describes the account
/// the client is authenticated as.
#[derive(Debug, Clone)]
pub struct CalendarViewSource {
    client: Arc<GroupwareClient>,
}

impl CalendarViewSource {
    /// Creates a calendar-view source over the given client.
    pub fn new(client: Arc<GroupwareClient>) -> Self {
        Self { client }
    }
}

impl AvailabilitySource for CalendarViewSource {
    fn name(&self) -> &str {
        "calendar-view"
    }

    fn get_busy_intervals(
        &self,
        _identities: &[String],
        range: Interval,
        _granularity_minutes: u32,
    ) -> BoxFuture<'_, SourceResult<Vec<BusyInterval>>> {
        Box::pin(async move {
            let tz = self.client.timezone();
            let events = self.client.calendar_view(range.start, range.end).await?;
            Ok(events
                .iter()
                .filter_map(|event| busy_interval_from_event(event, tz))
                .collect())
        })
    }
}
