//! Text and JSON output rendering.
//!
//! Every render function returns the finished string; commands print it.
//! JSON output serializes the protocol payloads as-is, so scripted use
//! sees the documented wire shapes.

use serde::Serialize;

use openslot_core::{BusyIntervalView, ContactSummary, EventSummary, EventTime, FreeSlotView,
    MessageSummary};
use openslot_protocol::StatusInfo;

use crate::error::ClientResult;

/// Serializes a payload as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> ClientResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(openslot_protocol::ProtocolError::from)?)
}

/// Formats whole minutes as a compact duration: `45m`, `2h`, `1h 30m`.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {rest}m")
    }
}

/// Renders free slots, one line per slot.
pub fn render_slots(slots: &[FreeSlotView]) -> String {
    if slots.is_empty() {
        return "No free slots found.".to_string();
    }

    let mut out = String::new();
    for slot in slots {
        out.push_str(&format!(
            "{:<9} {}  {}–{}  {}\n",
            slot.day,
            slot.date,
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M"),
            format_duration(slot.duration_minutes),
        ));
    }
    out
}

fn event_time(time: &EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        EventTime::AllDay(date) => format!("{date} (all day)"),
    }
}

/// Renders calendar events, one line per event.
pub fn render_events(events: &[EventSummary]) -> String {
    if events.is_empty() {
        return "No events.".to_string();
    }

    let mut out = String::new();
    for event in events {
        let mut line = format!("{}  {}", event_time(&event.start), event.subject);
        if let Some(location) = &event.location {
            line.push_str(&format!(" ({location})"));
        }
        if event.is_cancelled {
            line.push_str(" [cancelled]");
        }
        line.push_str(&format!("\n    id: {}\n", event.id));
        out.push_str(&line);
    }
    out
}

/// Renders mail messages, one line per message.
///
/// Unread messages are marked with `*`, attachments with `[a]`.
pub fn render_messages(messages: &[MessageSummary]) -> String {
    if messages.is_empty() {
        return "No messages.".to_string();
    }

    let mut out = String::new();
    for message in messages {
        let marker = if message.is_read { ' ' } else { '*' };
        let received = message
            .received
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----".to_string());
        let sender = message.sender.as_deref().unwrap_or("(unknown)");
        let attachments = if message.has_attachments { " [a]" } else { "" };
        out.push_str(&format!(
            "{marker} {received}  {sender}  {}{attachments}\n",
            message.subject
        ));
    }
    out
}

/// Renders contacts, one line per contact.
pub fn render_contacts(contacts: &[ContactSummary]) -> String {
    if contacts.is_empty() {
        return "No contacts.".to_string();
    }

    let mut out = String::new();
    for contact in contacts {
        let mut line = contact.display_name.clone();
        if let Some(email) = contact.emails.first() {
            line.push_str(&format!(" <{email}>"));
        }
        if let Some(company) = &contact.company {
            line.push_str(&format!("  {company}"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Renders a person's busy intervals.
pub fn render_agenda(intervals: &[BusyIntervalView]) -> String {
    if intervals.is_empty() {
        return "No busy intervals reported.".to_string();
    }

    let mut out = String::new();
    for interval in intervals {
        let status = serde_json::to_value(interval.status)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| "busy".to_string());
        let mut line = format!(
            "{}  {}–{}  {status}",
            interval.start.format("%Y-%m-%d"),
            interval.start.format("%H:%M"),
            interval.end.format("%H:%M"),
        );
        if let Some(subject) = &interval.subject {
            line.push_str(&format!("  {subject}"));
        }
        if let Some(location) = &interval.location {
            line.push_str(&format!(" ({location})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Renders daemon status.
pub fn render_status(info: &StatusInfo) -> String {
    let mut out = format!("uptime: {}\n", format_duration(info.uptime_seconds as i64 / 60));
    if let Some(account) = &info.account {
        out.push_str(&format!("account: {account}\n"));
    }
    match info.last_refresh {
        Some(at) => out.push_str(&format!("last refresh: {}\n", at.format("%Y-%m-%d %H:%M:%S UTC"))),
        None => out.push_str("last refresh: never\n"),
    }
    out.push_str(&format!("cached responses: {}\n", info.cache_entries));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(480), "8h");
    }

    #[test]
    fn slots_rendering() {
        let slot = FreeSlotView {
            start: DateTime::parse_from_rfc3339("2025-03-03T09:00:00+01:00").unwrap(),
            end: DateTime::parse_from_rfc3339("2025-03-03T10:30:00+01:00").unwrap(),
            duration_minutes: 90,
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            day: "Monday".to_string(),
        };
        let text = render_slots(&[slot]);
        assert!(text.contains("Monday"));
        assert!(text.contains("09:00–10:30"));
        assert!(text.contains("1h 30m"));

        assert_eq!(render_slots(&[]), "No free slots found.");
    }

    #[test]
    fn messages_rendering_marks_unread_and_attachments() {
        let message = MessageSummary {
            id: "m1".into(),
            subject: "Minutes".into(),
            sender: Some("colleague@example.com".into()),
            to: vec![],
            received: Some(DateTime::parse_from_rfc3339("2025-03-03T08:12:00+01:00").unwrap()),
            is_read: false,
            has_attachments: true,
        };
        let text = render_messages(&[message]);
        assert!(text.starts_with('*'));
        assert!(text.contains("[a]"));
        assert!(text.contains("Minutes"));
    }

    #[test]
    fn status_rendering() {
        let info = StatusInfo {
            uptime_seconds: 3600,
            account: Some("me@example.com".into()),
            last_refresh: None,
            cache_entries: 4,
        };
        let text = render_status(&info);
        assert!(text.contains("uptime: 1h"));
        assert!(text.contains("me@example.com"));
        assert!(text.contains("never"));
        assert!(text.contains("cached responses: 4"));
    }
}
