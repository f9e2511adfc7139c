//! Request and response types for the openslot protocol.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use openslot_core::{
    BusyIntervalView, ContactSummary, EventSummary, FreeSlotView, MessageSummary,
};

use crate::PROTOCOL_VERSION;

/// Message envelope wrapping all protocol messages.
///
/// Every message exchanged between client and daemon is wrapped in this
/// envelope, which provides versioning and request correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Unique request ID for correlation.
    pub request_id: String,
    /// The actual payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    /// Creates a request envelope.
    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    /// Creates a response envelope.
    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

fn default_weeks() -> u32 {
    1
}

fn default_min_duration() -> i64 {
    30
}

fn default_days() -> u32 {
    7
}

fn default_folder() -> String {
    "inbox".to_string()
}

fn default_message_limit() -> usize {
    20
}

fn default_contact_limit() -> usize {
    100
}

/// Requests sent from the client to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Find free slots. With no identities the daemon queries the
    /// configured account; with identities it computes common free slots
    /// for all of them in one batched availability query.
    FreeSlots {
        /// Identities to intersect (empty = the daemon's own account).
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        identities: Vec<String>,
        /// Number of weeks to scan (1 = rest of the current week).
        #[serde(default = "default_weeks")]
        weeks: u32,
        /// Minimum slot duration in minutes.
        #[serde(default = "default_min_duration")]
        min_duration_minutes: i64,
        /// Maximum number of slots to return.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
        /// Working-day start hour override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_hour: Option<u32>,
        /// Working-day end hour override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_hour: Option<u32>,
        /// Weekend exclusion override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude_weekends: Option<bool>,
    },

    /// Get another person's busy intervals (detailed where shared).
    Agenda {
        /// The identity to query.
        identity: String,
        /// Days ahead when no explicit range is given.
        #[serde(default = "default_days")]
        days: u32,
        /// Explicit range start.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<DateTime<Utc>>,
        /// Explicit range end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<DateTime<Utc>>,
    },

    /// List the account's calendar events.
    Events {
        /// Days ahead when no explicit range is given.
        #[serde(default = "default_days")]
        days: u32,
        /// Explicit range start.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<DateTime<Utc>>,
        /// Explicit range end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<DateTime<Utc>>,
    },

    /// Create a calendar event.
    CreateEvent {
        /// Event subject.
        subject: String,
        /// Event start.
        start: DateTime<FixedOffset>,
        /// Event end.
        end: DateTime<FixedOffset>,
        /// Event location.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        /// Event body text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },

    /// Delete a calendar event by provider ID.
    DeleteEvent {
        /// Provider item identifier.
        id: String,
    },

    /// List mail messages.
    Messages {
        /// Folder to list.
        #[serde(default = "default_folder")]
        folder: String,
        /// Maximum number of messages.
        #[serde(default = "default_message_limit")]
        limit: usize,
        /// Only unread messages.
        #[serde(default)]
        unread: bool,
    },

    /// List contacts.
    Contacts {
        /// Maximum number of contacts.
        #[serde(default = "default_contact_limit")]
        limit: usize,
        /// Filter by name or email substring.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        search: Option<String>,
    },

    /// Get daemon status.
    Status,

    /// Refresh cached data. With `force` the cache is bypassed and
    /// repopulated.
    Refresh {
        /// Bypass the cache.
        force: bool,
    },

    /// Ping to check daemon liveness.
    Ping,

    /// Request daemon shutdown.
    Shutdown,
}

/// Responses sent from the daemon to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Free slots matching a [`Request::FreeSlots`].
    Slots {
        /// The qualifying slots, ordered by date then start.
        slots: Vec<FreeSlotView>,
    },

    /// A person's busy intervals.
    Agenda {
        /// The reported intervals, as returned by the source.
        intervals: Vec<BusyIntervalView>,
    },

    /// Calendar events.
    Events {
        /// The listed events.
        events: Vec<EventSummary>,
    },

    /// A newly created calendar event.
    EventCreated {
        /// The created event as echoed by the provider.
        event: EventSummary,
    },

    /// Confirmation of a deletion.
    Deleted {
        /// The deleted item's identifier.
        id: String,
    },

    /// Mail messages.
    Messages {
        /// The listed messages.
        messages: Vec<MessageSummary>,
    },

    /// Contacts.
    Contacts {
        /// The listed contacts.
        contacts: Vec<ContactSummary>,
    },

    /// Daemon status information.
    Status {
        /// Status details.
        #[serde(flatten)]
        info: StatusInfo,
    },

    /// Generic success response.
    Ok,

    /// Pong response to Ping.
    Pong,

    /// Error response.
    Error {
        /// Error details.
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    /// Creates an error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }
}

/// Daemon status details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Seconds since the daemon started.
    pub uptime_seconds: u64,
    /// The account the daemon serves, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// When the scheduler last refreshed the default queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    /// Number of cached responses (including expired, pre-eviction).
    pub cache_entries: usize,
}

/// High-level classification of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request itself was invalid (bad parameters).
    InvalidRequest,
    /// Authentication with the groupware backend failed (after retry).
    AuthFailed,
    /// The groupware backend was unreachable or returned a server error.
    SourceUnavailable,
    /// The referenced item does not exist.
    NotFound,
    /// Unexpected daemon-side failure.
    Internal,
}

impl ErrorCode {
    /// Returns the wire name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::AuthFailed => "auth_failed",
            Self::SourceUnavailable => "source_unavailable",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// Error payload carried by [`Response::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error classification.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_version() {
        let envelope = Envelope::request("req-1", Request::Ping);
        assert!(envelope.is_compatible());

        let old = Envelope {
            protocol_version: "0".to_string(),
            request_id: "req-1".to_string(),
            payload: Request::Ping,
        };
        assert!(!old.is_compatible());
    }

    #[test]
    fn free_slots_defaults_apply() {
        let parsed: Request = serde_json::from_str(r#"{"type": "free_slots"}"#).unwrap();
        match parsed {
            Request::FreeSlots {
                identities,
                weeks,
                min_duration_minutes,
                limit,
                start_hour,
                end_hour,
                exclude_weekends,
            } => {
                assert!(identities.is_empty());
                assert_eq!(weeks, 1);
                assert_eq!(min_duration_minutes, 30);
                assert_eq!(limit, None);
                assert_eq!(start_hour, None);
                assert_eq!(end_hour, None);
                assert_eq!(exclude_weekends, None);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn free_slots_roundtrip() {
        let request = Request::FreeSlots {
            identities: vec!["a@example.com".into(), "b@example.com".into()],
            weeks: 2,
            min_duration_minutes: 45,
            limit: Some(3),
            start_hour: Some(8),
            end_hour: Some(18),
            exclude_weekends: Some(false),
        };
        let json = serde_json::to_string(&request).unwrap();
        let parsed: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn messages_defaults_apply() {
        let parsed: Request = serde_json::from_str(r#"{"type": "messages"}"#).unwrap();
        assert_eq!(
            parsed,
            Request::Messages {
                folder: "inbox".to_string(),
                limit: 20,
                unread: false,
            }
        );
    }

    #[test]
    fn error_response_flattens() {
        let response = Response::error(ErrorCode::AuthFailed, "token rejected");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "auth_failed");
        assert_eq!(json["message"], "token rejected");

        let parsed: Response = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn status_response_flattens() {
        let response = Response::Status {
            info: StatusInfo {
                uptime_seconds: 42,
                account: Some("me@example.com".into()),
                last_refresh: None,
                cache_entries: 3,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["uptime_seconds"], 42);
        assert_eq!(json["cache_entries"], 3);

        let parsed: Response = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn request_wire_names_are_snake_case() {
        let json = serde_json::to_value(Request::DeleteEvent { id: "x".into() }).unwrap();
        assert_eq!(json["type"], "delete_event");

        let json = serde_json::to_value(Request::Refresh { force: false }).unwrap();
        assert_eq!(json["type"], "refresh");
    }
}
