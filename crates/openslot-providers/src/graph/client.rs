//! Groupware REST client.
//!
//! A low-level HTTP client for the groupware backend: free/busy schedule
//! queries, calendar view, event create/delete, message and contact
//! listings. Bearer tokens come from the external OAuth helper and are
//! cached until shortly before their expected expiry.

use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use openslot_core::{BusyInterval, ContactSummary, EventSummary, Interval, MessageSummary};

use crate::error::{SourceError, SourceResult};
use crate::graph::config::GroupwareConfig;
use crate::graph::schema::{
    self, WireEvent, WireList, WireMessage, WireScheduleInfo, event_summary,
};
use crate::token::TokenHelper;

/// OAuth tokens typically live an hour; treat them as stale five minutes
/// before the expected expiry.
const TOKEN_LIFETIME: Duration = Duration::from_secs(55 * 60);
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CachedToken {
    value: String,
    acquired_at: Instant,
}

impl CachedToken {
    fn new(value: String) -> Self {
        Self {
            value,
            acquired_at: Instant::now(),
        }
    }

    fn is_stale(&self) -> bool {
        self.acquired_at.elapsed() >= TOKEN_LIFETIME - TOKEN_REFRESH_MARGIN
    }
}

/// HTTP client for the groupware REST backend.
#[derive(Debug)]
pub struct GroupwareClient {
    http: reqwest::Client,
    config: GroupwareConfig,
    helper: TokenHelper,
    token: RwLock<Option<CachedToken>>,
}

impl GroupwareClient {
    /// Creates a client from the given configuration.
    pub fn new(config: GroupwareConfig) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                SourceError::configuration("failed to create HTTP client").with_source(e)
            })?;
        let helper = TokenHelper::new(config.helper.clone());

        Ok(Self {
            http,
            config,
            helper,
            token: RwLock::new(None),
        })
    }

    /// Returns the account this client acts as.
    pub fn account(&self) -> &str {
        &self.config.account
    }

    /// Returns the working timezone results are converted into.
    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    /// Forces a credential renewal through the OAuth helper.
    ///
    /// Used as the recovery action of the auth-retry policy, and by the
    /// daemon's proactive token refresh loop.
    pub async fn renew_credentials(&self) -> SourceResult<()> {
        self.helper.renew(&self.config.account).await?;
        let fresh = self.helper.access(&self.config.account).await?;
        *self.token.write().await = Some(CachedToken::new(fresh));
        Ok(())
    }

    /// Queries free/busy schedules for the identities in one batch.
    pub async fn get_schedule(
        &self,
        identities: &[String],
        range: Interval,
        granularity_minutes: u32,
    ) -> SourceResult<Vec<BusyInterval>> {
        let body = schedule_request_body(identities, range, granularity_minutes);
        let text = self.post("/me/calendar/getSchedule", &body).await?;
        let list: WireList<WireScheduleInfo> = parse_json(&text)?;

        let tz = self.config.timezone;
        let intervals: Vec<BusyInterval> = list
            .value
            .iter()
            .flat_map(|info| info.schedule_items.iter())
            .filter_map(|item| schema::busy_interval_from_schedule_item(item, tz))
            .collect();

        debug!(
            identities = identities.len(),
            intervals = intervals.len(),
            "fetched schedule"
        );
        Ok(intervals)
    }

    /// Fetches the raw calendar view for the account's own calendar.
    pub async fn calendar_view(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> SourceResult<Vec<WireEvent>> {
        let text = self
            .get(
                "/me/calendarView",
                &[
                    ("startDateTime", start.with_timezone(&Utc).to_rfc3339()),
                    ("endDateTime", end.with_timezone(&Utc).to_rfc3339()),
                    ("$orderby", "start/dateTime".to_string()),
                ],
            )
            .await?;
        let list: WireList<WireEvent> = parse_json(&text)?;
        Ok(list.value)
    }

    /// Lists the account's calendar events as summaries.
    pub async fn list_events(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> SourceResult<Vec<EventSummary>> {
        let tz = self.config.timezone;
        let mut events: Vec<EventSummary> = self
            .calendar_view(start, end)
            .await?
            .iter()
            .filter_map(|event| event_summary(event, tz))
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }

    /// Creates a calendar event and returns the provider's echo of it.
    pub async fn create_event(
        &self,
        subject: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        location: Option<&str>,
        body_text: Option<&str>,
    ) -> SourceResult<EventSummary> {
        let body = event_request_body(subject, start, end, location, body_text);
        let text = self.post("/me/events", &body).await?;
        let event: WireEvent = parse_json(&text)?;
        event_summary(&event, self.config.timezone)
            .ok_or_else(|| SourceError::invalid_response("created event is missing times"))
    }

    /// Deletes a calendar event by provider ID.
    pub async fn delete_event(&self, id: &str) -> SourceResult<()> {
        self.delete(&format!("/me/events/{id}")).await?;
        Ok(())
    }

    /// Lists mail messages in a folder, newest first.
    pub async fn list_messages(
        &self,
        folder: &str,
        limit: usize,
        unread: bool,
    ) -> SourceResult<Vec<MessageSummary>> {
        let mut query = vec![
            ("$top", limit.to_string()),
            ("$orderby", "receivedDateTime desc".to_string()),
        ];
        if unread {
            query.push(("$filter", "isRead eq false".to_string()));
        }

        let text = self
            .get(&format!("/me/mailFolders/{folder}/messages"), &query)
            .await?;
        let list: WireList<WireMessage> = parse_json(&text)?;
        Ok(list
            .value
            .iter()
            .filter_map(schema::message_summary)
            .collect())
    }

    /// Lists contacts, optionally filtered by a name/email substring.
    ///
    /// The filter is applied client-side, matching the backend's lack of
    /// substring search on contact collections.
    pub async fn list_contacts(
        &self,
        limit: usize,
        search: Option<&str>,
    ) -> SourceResult<Vec<ContactSummary>> {
        let text = self
            .get("/me/contacts", &[("$top", limit.to_string())])
            .await?;
        let list: WireList<schema::WireContact> = parse_json(&text)?;

        let mut contacts: Vec<ContactSummary> = list
            .value
            .iter()
            .filter_map(schema::contact_summary)
            .collect();
        if let Some(needle) = search {
            contacts.retain(|c| c.matches(needle));
        }
        Ok(contacts)
    }

    async fn bearer(&self) -> SourceResult<String> {
        {
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref()
                && !token.is_stale()
            {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.helper.access(&self.config.account).await?;
        *self.token.write().await = Some(CachedToken::new(fresh.clone()));
        Ok(fresh)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> SourceResult<String> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;
        read_body(response).await
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> SourceResult<String> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(request_error)?;
        read_body(response).await
    }

    async fn delete(&self, path: &str) -> SourceResult<String> {
        let token = self.bearer().await?;
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(request_error)?;
        read_body(response).await
    }
}

/// Builds the free/busy request body. Times are sent as UTC wall clock.
fn schedule_request_body(
    identities: &[String],
    range: Interval,
    granularity_minutes: u32,
) -> serde_json::Value {
    json!({
        "schedules": identities,
        "startTime": wire_utc(range.start),
        "endTime": wire_utc(range.end),
        "availabilityViewInterval": granularity_minutes,
    })
}

/// Builds the event creation body.
fn event_request_body(
    subject: &str,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    location: Option<&str>,
    body_text: Option<&str>,
) -> serde_json::Value {
    let mut body = json!({
        "subject": subject,
        "start": wire_utc_fixed(start),
        "end": wire_utc_fixed(end),
    });
    if let Some(location) = location {
        body["location"] = json!({ "displayName": location });
    }
    if let Some(text) = body_text {
        body["body"] = json!({ "contentType": "text", "content": text });
    }
    body
}

fn wire_utc(dt: DateTime<Tz>) -> serde_json::Value {
    json!({
        "dateTime": dt.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%S").to_string(),
        "timeZone": "UTC",
    })
}

fn wire_utc_fixed(dt: DateTime<FixedOffset>) -> serde_json::Value {
    json!({
        "dateTime": dt.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%S").to_string(),
        "timeZone": "UTC",
    })
}

fn request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::network("request timeout").with_source(e)
    } else if e.is_connect() {
        SourceError::network("connection failed").with_source(e)
    } else {
        SourceError::network("request failed").with_source(e)
    }
}

/// Maps a non-success status to an error; `None` for success statuses.
fn status_error(status: StatusCode, body: &str) -> Option<SourceError> {
    match status {
        StatusCode::UNAUTHORIZED => {
            Some(SourceError::authentication("access token expired or invalid"))
        }
        StatusCode::FORBIDDEN => Some(SourceError::authentication("access denied")),
        StatusCode::NOT_FOUND => Some(SourceError::not_found("no such item")),
        StatusCode::TOO_MANY_REQUESTS => Some(SourceError::rate_limited("rate limit exceeded")),
        s if s.is_success() => None,
        s => Some(SourceError::server(format!("API error ({s}): {body}"))),
    }
}

async fn read_body(response: reqwest::Response) -> SourceResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SourceError::network("failed to read response").with_source(e))?;

    match status_error(status, &body) {
        Some(err) => Err(err),
        None => Ok(body),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> SourceResult<T> {
    serde_json::from_str(text)
        .map_err(|e| SourceError::invalid_response(format!("failed to parse response: {e}")))
}
