//! Core types and the free/busy slot engine.
//!
//! Everything in this crate is a pure, synchronous computation: no I/O, no
//! shared state, no clocks. The explicit range start doubles as the "now"
//! clip for the first day, so repeated calls with the same inputs produce
//! identical output.

pub mod busy;
pub mod error;
pub mod interval;
pub mod items;
pub mod merge;
pub mod query;
pub mod slots;
pub mod tracing;
pub mod window;

pub use busy::{BusyInterval, BusyIntervalView, BusyStatus};
pub use error::{CoreError, CoreResult};
pub use interval::Interval;
pub use items::{ContactSummary, EventSummary, EventTime, MessageSummary};
pub use merge::merge;
pub use query::Query;
pub use slots::{FreeSlot, FreeSlotView, compute_free_slots, find_free_slots};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use window::{
    DayWindow, SLOT_QUANTUM_MINUTES, WorkingWindowConfig, WorkingWindows, parse_timezone,
    range_for_weeks, round_up_to_quantum,
};
