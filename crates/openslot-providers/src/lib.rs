//! Availability sources and the groupware REST client.
//!
//! This crate owns every interaction with the outside world that the slot
//! engine's callers need: the REST backend (calendar, mail, contacts,
//! free/busy schedules), the external OAuth token helper, and the
//! retry-on-auth-failure policy that wraps backend calls.

pub mod error;
pub mod graph;
pub mod retry;
pub mod source;
pub mod sources;
pub mod token;

pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use graph::{CalendarItemKind, GroupwareClient, GroupwareConfig};
pub use retry::with_auth_retry;
pub use source::{AvailabilitySource, BoxFuture};
pub use sources::{CalendarViewSource, ScheduleSource};
pub use token::TokenHelper;
