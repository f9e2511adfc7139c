//! Wire-facing summaries of groupware items.
//!
//! These are the provider-agnostic shapes the daemon returns for calendar
//! events, mail messages, and contacts. They carry only what the CLI
//! renders; bodies and attachments stay on the server side.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The time of a calendar event: a specific instant or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    /// A specific instant with its source offset.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Returns true if this is an all-day time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the date portion.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(d) => *d,
        }
    }

    /// Normalizes to an instant for ordering; all-day times compare at
    /// midnight UTC.
    fn sort_key(&self) -> DateTime<chrono::Utc> {
        match self {
            Self::DateTime(dt) => dt.to_utc(),
            Self::AllDay(d) => d.and_hms_opt(0, 0, 0).expect("valid time").and_utc(),
        }
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A calendar event as listed by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Provider item identifier.
    pub id: String,
    /// Event subject.
    pub subject: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends.
    pub end: EventTime,
    /// Event location, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Organizer address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Whether this is an all-day event.
    pub is_all_day: bool,
    /// Whether the event has been cancelled.
    pub is_cancelled: bool,
}

/// A mail message as listed by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    /// Provider item identifier.
    pub id: String,
    /// Message subject.
    pub subject: String,
    /// Sender address, if known.
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Recipient addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    /// When the message was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<DateTime<FixedOffset>>,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Whether the message carries attachments.
    pub has_attachments: bool,
}

/// A contact as listed by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
    /// Provider item identifier.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Known email addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    /// Known phone numbers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
    /// Company name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Job title, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl ContactSummary {
    /// Case-insensitive match against name and email addresses.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.display_name.to_lowercase().contains(&needle)
            || self
                .emails
                .iter()
                .any(|e| e.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn event_time_ordering() {
        let morning = EventTime::DateTime(instant("2025-03-03T09:00:00+01:00"));
        let noon = EventTime::DateTime(instant("2025-03-03T12:00:00+01:00"));
        let all_day = EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

        assert!(morning < noon);
        assert!(all_day < morning); // midnight sorts first
        assert_eq!(all_day.date(), morning.date());
        assert!(all_day.is_all_day());
        assert!(!noon.is_all_day());
    }

    #[test]
    fn event_time_serde() {
        let et = EventTime::DateTime(instant("2025-03-03T09:00:00+01:00"));
        let json = serde_json::to_string(&et).unwrap();
        let parsed: EventTime = serde_json::from_str(&json).unwrap();
        assert_eq!(et, parsed);

        let all_day = EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        let json = serde_json::to_string(&all_day).unwrap();
        assert!(json.contains("all_day"));
        let parsed: EventTime = serde_json::from_str(&json).unwrap();
        assert_eq!(all_day, parsed);
    }

    #[test]
    fn message_sender_serializes_as_from() {
        let msg = MessageSummary {
            id: "msg-1".into(),
            subject: "Weekly report".into(),
            sender: Some("boss@example.com".into()),
            to: vec!["me@example.com".into()],
            received: Some(instant("2025-03-03T08:12:00+01:00")),
            is_read: false,
            has_attachments: true,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["from"], "boss@example.com");

        let parsed: MessageSummary = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn contact_matching() {
        let contact = ContactSummary {
            id: "c-1".into(),
            display_name: "Ada Lovelace".into(),
            emails: vec!["ada@example.com".into()],
            phones: vec![],
            company: Some("Analytical Engines".into()),
            job_title: None,
        };
        assert!(contact.matches("ada"));
        assert!(contact.matches("LOVELACE"));
        assert!(contact.matches("example.com"));
        assert!(!contact.matches("babbage"));
    }
}
