//! Wire types of the groupware REST backend and their conversions.
//!
//! Everything the backend returns is deserialized into a `Wire*` struct
//! here and converted to the crate-agnostic core types at this boundary;
//! no other module touches the wire format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use openslot_core::{
    BusyInterval, BusyStatus, ContactSummary, EventSummary, EventTime, Interval, MessageSummary,
};

/// A `{ "value": [...] }` collection envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WireList<T> {
    /// The collection items.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A wall-clock time with a named zone, e.g.
/// `{"dateTime": "2025-03-03T09:00:00.0000000", "timeZone": "UTC"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateTime {
    /// Wall-clock timestamp, usually without an offset.
    pub date_time: String,
    /// IANA zone name or "UTC".
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireLocation {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireEmailAddress {
    pub address: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireRecipient {
    pub email_address: Option<WireEmailAddress>,
}

/// A calendar event as returned by the calendar-view endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireEvent {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub start: Option<WireDateTime>,
    pub end: Option<WireDateTime>,
    pub is_all_day: bool,
    pub is_cancelled: bool,
    pub location: Option<WireLocation>,
    pub organizer: Option<WireRecipient>,
}

/// One identity's schedule in a free/busy response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireScheduleInfo {
    pub schedule_id: Option<String>,
    pub schedule_items: Vec<WireScheduleItem>,
}

/// A single busy interval in a free/busy response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireScheduleItem {
    pub status: Option<String>,
    pub start: Option<WireDateTime>,
    pub end: Option<WireDateTime>,
    pub subject: Option<String>,
    pub location: Option<String>,
}

/// A mail message as returned by the message-listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireMessage {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub from: Option<WireRecipient>,
    pub to_recipients: Vec<WireRecipient>,
    pub received_date_time: Option<String>,
    pub is_read: bool,
    pub has_attachments: bool,
}

/// A contact as returned by the contact-listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireContact {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub email_addresses: Vec<WireEmailAddress>,
    pub business_phones: Vec<String>,
    pub mobile_phone: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
}

/// The kind of a calendar item, decided once and matched exhaustively.
///
/// Wire events are heterogeneous (timed, all-day, cancelled); every
/// consumer goes through this classification instead of probing optional
/// fields ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarItemKind {
    /// A normal event with concrete instants.
    Timed {
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    },
    /// An all-day event spanning whole dates (end date exclusive).
    AllDay {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// A cancelled event; contributes nothing to occupancy.
    Cancelled,
}

/// Classifies a wire event. Returns `None` (with a log line) for items
/// whose times cannot be parsed.
pub fn classify_event(event: &WireEvent, tz: Tz) -> Option<CalendarItemKind> {
    if event.is_cancelled {
        return Some(CalendarItemKind::Cancelled);
    }
    let start = event.start.as_ref()?;
    let end = event.end.as_ref()?;

    if event.is_all_day {
        Some(CalendarItemKind::AllDay {
            start_date: parse_wire_date(start)?,
            end_date: parse_wire_date(end)?,
        })
    } else {
        Some(CalendarItemKind::Timed {
            start: parse_wire_datetime(start, tz)?,
            end: parse_wire_datetime(end, tz)?,
        })
    }
}

/// Converts a wire event into a busy interval in the working timezone.
///
/// All-day events occupy midnight-to-midnight; cancelled events and
/// unparseable items contribute nothing.
pub fn busy_interval_from_event(event: &WireEvent, tz: Tz) -> Option<BusyInterval> {
    let interval = match classify_event(event, tz)? {
        CalendarItemKind::Cancelled => return None,
        CalendarItemKind::Timed { start, end } => Interval::from_endpoints(start, end),
        CalendarItemKind::AllDay {
            start_date,
            end_date,
        } => Interval::from_endpoints(midnight(start_date, tz)?, midnight(end_date, tz)?),
    };

    let mut busy = BusyInterval::new(interval, BusyStatus::Busy);
    if let Some(subject) = &event.subject {
        busy = busy.with_subject(subject.clone());
    }
    if let Some(location) = event.location.as_ref().and_then(|l| l.display_name.clone()) {
        busy = busy.with_location(location);
    }
    Some(busy)
}

/// Converts a free/busy schedule item into a busy interval.
pub fn busy_interval_from_schedule_item(item: &WireScheduleItem, tz: Tz) -> Option<BusyInterval> {
    let start = parse_wire_datetime(item.start.as_ref()?, tz)?;
    let end = parse_wire_datetime(item.end.as_ref()?, tz)?;

    let mut busy = BusyInterval::new(
        Interval::from_endpoints(start, end),
        parse_schedule_status(item.status.as_deref()),
    );
    if let Some(subject) = &item.subject {
        busy = busy.with_subject(subject.clone());
    }
    if let Some(location) = &item.location {
        busy = busy.with_location(location.clone());
    }
    Some(busy)
}

/// Maps a wire free/busy status to [`BusyStatus`].
///
/// Unrecognized and absent statuses map to `NoData`, which counts as
/// occupied.
pub fn parse_schedule_status(status: Option<&str>) -> BusyStatus {
    match status {
        Some("free") => BusyStatus::Free,
        Some("tentative") => BusyStatus::Tentative,
        Some("busy") => BusyStatus::Busy,
        Some("oof") => BusyStatus::OutOfOffice,
        Some("workingElsewhere") => BusyStatus::WorkingElsewhere,
        _ => BusyStatus::NoData,
    }
}

/// Converts a wire event into the listing summary.
pub fn event_summary(event: &WireEvent, tz: Tz) -> Option<EventSummary> {
    let id = event.id.clone()?;

    let (start, end) = if event.is_all_day {
        (
            EventTime::AllDay(parse_wire_date(event.start.as_ref()?)?),
            EventTime::AllDay(parse_wire_date(event.end.as_ref()?)?),
        )
    } else {
        (
            EventTime::DateTime(parse_wire_datetime(event.start.as_ref()?, tz)?.fixed_offset()),
            EventTime::DateTime(parse_wire_datetime(event.end.as_ref()?, tz)?.fixed_offset()),
        )
    };

    Some(EventSummary {
        id,
        subject: event.subject.clone().unwrap_or_default(),
        start,
        end,
        location: event.location.as_ref().and_then(|l| l.display_name.clone()),
        organizer: recipient_address(event.organizer.as_ref()),
        is_all_day: event.is_all_day,
        is_cancelled: event.is_cancelled,
    })
}

/// Converts a wire message into the listing summary.
pub fn message_summary(message: &WireMessage) -> Option<MessageSummary> {
    Some(MessageSummary {
        id: message.id.clone()?,
        subject: message.subject.clone().unwrap_or_default(),
        sender: recipient_address(message.from.as_ref()),
        to: message
            .to_recipients
            .iter()
            .filter_map(|r| recipient_address(Some(r)))
            .collect(),
        received: message
            .received_date_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok()),
        is_read: message.is_read,
        has_attachments: message.has_attachments,
    })
}

/// Converts a wire contact into the listing summary.
pub fn contact_summary(contact: &WireContact) -> Option<ContactSummary> {
    let mut phones: Vec<String> = contact.business_phones.clone();
    if let Some(mobile) = &contact.mobile_phone {
        phones.push(mobile.clone());
    }

    Some(ContactSummary {
        id: contact.id.clone()?,
        display_name: contact.display_name.clone().unwrap_or_default(),
        emails: contact
            .email_addresses
            .iter()
            .filter_map(|e| e.address.clone())
            .collect(),
        phones,
        company: contact.company_name.clone(),
        job_title: contact.job_title.clone(),
    })
}

/// Parses a wire wall-clock time into the working timezone.
///
/// Offset-bearing timestamps are converted directly; naive timestamps are
/// interpreted in their declared zone (defaulting to UTC, which is what
/// every request here asks the backend for).
pub fn parse_wire_datetime(wdt: &WireDateTime, working_tz: Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(&wdt.date_time) {
        return Some(dt.with_timezone(&working_tz));
    }

    let naive = match NaiveDateTime::parse_from_str(&wdt.date_time, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive,
        Err(e) => {
            warn!(value = %wdt.date_time, error = %e, "unparseable wire timestamp");
            return None;
        }
    };

    match wdt.time_zone.as_deref() {
        None | Some("UTC") => Some(Utc.from_utc_datetime(&naive).with_timezone(&working_tz)),
        Some(name) => match name.parse::<Tz>() {
            Ok(zone) => zone
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&working_tz)),
            Err(_) => {
                warn!(zone = %name, "unknown source timezone");
                None
            }
        },
    }
}

fn parse_wire_date(wdt: &WireDateTime) -> Option<NaiveDate> {
    let date_part = wdt.date_time.get(..10)?;
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(value = %wdt.date_time, error = %e, "unparseable wire date");
            None
        }
    }
}

fn recipient_address(recipient: Option<&WireRecipient>) -> Option<String> {
    recipient?.email_address.as_ref()?.address.clone()
}

fn midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}
