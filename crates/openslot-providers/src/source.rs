//! The AvailabilitySource trait.
//!
//! The one interface the slot engine's callers consume: given identities
//! and a time range, return raw busy intervals. The engine itself never
//! calls a source; the daemon fetches first, then runs the pure core on
//! the result.

use std::future::Future;
use std::pin::Pin;

use openslot_core::{BusyInterval, Interval};

use crate::error::SourceResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so the daemon can hold sources as
/// `Arc<dyn AvailabilitySource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Supplies raw busy intervals for one or more identities.
///
/// Implementations must return intervals already expressed in the working
/// timezone of the passed range. Intervals with status `free` may be
/// returned; the merger ignores them. Malformed intervals are normalized
/// at the [`Interval`] boundary.
///
/// Failures (network, auth) are the caller's to handle; the usual wrapper
/// is [`with_auth_retry`](crate::retry::with_auth_retry) with a token
/// renewal as the recovery action.
pub trait AvailabilitySource: Send + Sync {
    /// Returns the name of this source (e.g. "schedule", "calendar-view").
    fn name(&self) -> &str;

    /// Fetches busy intervals for the identities over the range.
    ///
    /// `granularity_minutes` is the resolution hint passed to the backend;
    /// sources that have exact interval data may ignore it.
    fn get_busy_intervals(
        &self,
        identities: &[String],
        range: Interval,
        granularity_minutes: u32,
    ) -> BoxFuture<'_, SourceResult<Vec<BusyInterval>>>;
}
