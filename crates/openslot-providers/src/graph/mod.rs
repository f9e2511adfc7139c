//! Groupware REST backend: client, configuration, wire schema.

pub mod client;
pub mod config;
pub mod schema;

pub use client::GroupwareClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TOKEN_HELPER, GroupwareConfig};
pub use schema::CalendarItemKind;
