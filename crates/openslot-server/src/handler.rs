//! Request dispatch.
//!
//! Routes protocol requests to the groupware client and the slot engine.
//! Every backend call is wrapped in the auth-retry policy with a
//! credential renewal as the recovery action. The slot engine is invoked
//! fresh per request on whatever the availability source returned.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info, warn};

use openslot_core::{
    BusyInterval, BusyIntervalView, FreeSlotView, Interval, Query, compute_free_slots,
    range_for_weeks,
};
use openslot_protocol::{ErrorCode, Request, Response, StatusInfo};
use openslot_providers::{
    AvailabilitySource, CalendarViewSource, GroupwareClient, ScheduleSource, SourceError,
    SourceErrorCode, SourceResult, with_auth_retry,
};

use crate::cache::{ResponseCache, cache_key};
use crate::config::ServerConfig;

/// Free/busy granularity for detailed agenda queries.
const AGENDA_GRANULARITY_MINUTES: u32 = 30;

#[derive(Debug, Default)]
struct HandlerState {
    last_refresh: Option<DateTime<Utc>>,
}

/// Dispatches protocol requests against the groupware backend.
pub struct RequestHandler {
    config: ServerConfig,
    client: Arc<GroupwareClient>,
    schedule: ScheduleSource,
    fallback: CalendarViewSource,
    cache: Arc<RwLock<ResponseCache>>,
    state: RwLock<HandlerState>,
    start_time: DateTime<Utc>,
    shutdown: Arc<Notify>,
}

impl RequestHandler {
    /// Creates a handler over the given client and injected cache.
    pub fn new(
        config: ServerConfig,
        client: Arc<GroupwareClient>,
        cache: Arc<RwLock<ResponseCache>>,
    ) -> Self {
        Self {
            schedule: ScheduleSource::new(client.clone()),
            fallback: CalendarViewSource::new(client.clone()),
            config,
            client,
            cache,
            state: RwLock::new(HandlerState::default()),
            start_time: Utc::now(),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Returns the shutdown notifier; the serve loop awaits it.
    pub fn shutdown_notify(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Dispatches a request, consulting the cache for cacheable requests.
    pub async fn dispatch(&self, request: Request) -> Response {
        let key = cache_key_for(&request);

        if let Some(key) = &key
            && let Some(entry) = self.cache.read().await.get_valid(key)
        {
            debug!(key = %key, "cache hit");
            return entry.value.clone();
        }

        let response = self.dispatch_uncached(request).await;

        if let Some(key) = key
            && !matches!(response, Response::Error { .. })
        {
            self.cache.write().await.insert(key, response.clone());
        }
        response
    }

    /// Dispatches a request without consulting or filling the cache.
    async fn dispatch_uncached(&self, request: Request) -> Response {
        match request {
            Request::FreeSlots {
                identities,
                weeks,
                min_duration_minutes,
                limit,
                start_hour,
                end_hour,
                exclude_weekends,
            } => {
                self.handle_free_slots(
                    identities,
                    weeks,
                    min_duration_minutes,
                    limit,
                    start_hour,
                    end_hour,
                    exclude_weekends,
                )
                .await
            }
            Request::Agenda {
                identity,
                days,
                from,
                to,
            } => self.handle_agenda(identity, days, from, to).await,
            Request::Events { days, from, to } => self.handle_events(days, from, to).await,
            Request::CreateEvent {
                subject,
                start,
                end,
                location,
                body,
            } => {
                let result = with_auth_retry(
                    || {
                        self.client.create_event(
                            &subject,
                            start,
                            end,
                            location.as_deref(),
                            body.as_deref(),
                        )
                    },
                    || self.client.renew_credentials(),
                )
                .await;
                match result {
                    Ok(event) => Response::EventCreated { event },
                    Err(err) => error_response(err),
                }
            }
            Request::DeleteEvent { id } => {
                let result = with_auth_retry(
                    || self.client.delete_event(&id),
                    || self.client.renew_credentials(),
                )
                .await;
                match result {
                    Ok(()) => Response::Deleted { id },
                    Err(err) => error_response(err),
                }
            }
            Request::Messages {
                folder,
                limit,
                unread,
            } => {
                let result = with_auth_retry(
                    || self.client.list_messages(&folder, limit, unread),
                    || self.client.renew_credentials(),
                )
                .await;
                match result {
                    Ok(messages) => Response::Messages { messages },
                    Err(err) => error_response(err),
                }
            }
            Request::Contacts { limit, search } => {
                let result = with_auth_retry(
                    || self.client.list_contacts(limit, search.as_deref()),
                    || self.client.renew_credentials(),
                )
                .await;
                match result {
                    Ok(contacts) => Response::Contacts { contacts },
                    Err(err) => error_response(err),
                }
            }
            Request::Status => {
                let state = self.state.read().await;
                Response::Status {
                    info: StatusInfo {
                        uptime_seconds: (Utc::now() - self.start_time).num_seconds().max(0) as u64,
                        account: Some(self.config.account.clone()),
                        last_refresh: state.last_refresh,
                        cache_entries: self.cache.read().await.len(),
                    },
                }
            }
            Request::Refresh { force } => {
                if force {
                    self.cache.write().await.clear();
                }
                self.refresh_defaults().await;
                Response::Ok
            }
            Request::Ping => Response::Pong,
            Request::Shutdown => {
                info!("shutdown requested");
                self.shutdown.notify_waiters();
                Response::Ok
            }
        }
    }

    /// Repopulates the cache for the default queries.
    ///
    /// Called by the background scheduler and by `Refresh` requests.
    /// Failures are logged per query; the rest still refresh. Returns the
    /// number of queries that failed.
    pub async fn refresh_defaults(&self) -> usize {
        let mut failures = 0;
        for request in default_requests() {
            let Some(key) = cache_key_for(&request) else {
                continue;
            };
            match Box::pin(self.dispatch_uncached(request)).await {
                Response::Error { error } => {
                    warn!(key = %key, code = %error.code.as_str(), message = %error.message,
                        "default refresh failed");
                    failures += 1;
                }
                response => {
                    self.cache.write().await.insert(key, response);
                }
            }
        }
        self.state.write().await.last_refresh = Some(Utc::now());
        failures
    }

    /// Proactively renews the OAuth token (scheduler loop).
    pub async fn renew_token(&self) -> SourceResult<()> {
        self.client.renew_credentials().await
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_free_slots(
        &self,
        identities: Vec<String>,
        weeks: u32,
        min_duration_minutes: i64,
        limit: Option<usize>,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
        exclude_weekends: Option<bool>,
    ) -> Response {
        let window = match self
            .config
            .window
            .overridden(start_hour, end_hour, exclude_weekends)
        {
            Ok(window) => window,
            Err(err) => return Response::error(ErrorCode::InvalidRequest, err.to_string()),
        };

        let now = Utc::now().with_timezone(&window.timezone);
        let (range_start, range_end) = range_for_weeks(now, weeks);

        let identities = if identities.is_empty() {
            vec![self.config.account.clone()]
        } else {
            identities
        };
        let query = Query::new(identities, range_start, range_end, min_duration_minutes);
        let query = match limit {
            Some(limit) => query.with_limit(limit),
            None => query,
        };

        let busy = match self.fetch_busy(&query).await {
            Ok(busy) => busy,
            Err(err) => return error_response(err),
        };

        let slots = compute_free_slots(
            &busy,
            query.range_start,
            query.range_end,
            &window,
            query.min_duration_minutes,
            query.limit,
        );
        debug!(slots = slots.len(), "computed free slots");
        Response::Slots {
            slots: slots.iter().map(FreeSlotView::from).collect(),
        }
    }

    /// Fetches busy intervals for a query.
    ///
    /// The schedule source is authoritative; for the daemon's own account
    /// an empty or failed schedule answer falls back to reading the
    /// calendar view directly (some deployments restrict the free/busy
    /// endpoint but not the calendar itself).
    async fn fetch_busy(&self, query: &Query) -> SourceResult<Vec<BusyInterval>> {
        let range = Interval::new(query.range_start, query.range_end);
        let granularity = self.config.granularity_minutes;

        let primary = with_auth_retry(
            || self.schedule.get_busy_intervals(&query.identities, range, granularity),
            || self.client.renew_credentials(),
        )
        .await;

        let own_only =
            query.identities.len() == 1 && query.identities[0] == self.config.account;

        match primary {
            Ok(busy) if !busy.is_empty() || !own_only => Ok(busy),
            Ok(_) => {
                debug!("schedule endpoint returned nothing, reading own calendar");
                self.fetch_own_calendar(range, granularity).await
            }
            Err(err) if own_only => {
                warn!(error = %err, "schedule endpoint failed, reading own calendar");
                self.fetch_own_calendar(range, granularity).await
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_own_calendar(
        &self,
        range: Interval,
        granularity: u32,
    ) -> SourceResult<Vec<BusyInterval>> {
        with_auth_retry(
            || self.fallback.get_busy_intervals(&[], range, granularity),
            || self.client.renew_credentials(),
        )
        .await
    }

    async fn handle_agenda(
        &self,
        identity: String,
        days: u32,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Response {
        let tz = self.config.window.timezone;
        let start = from
            .map(|dt| dt.with_timezone(&tz))
            .unwrap_or_else(|| Utc::now().with_timezone(&tz));
        let end = to
            .map(|dt| dt.with_timezone(&tz))
            .unwrap_or_else(|| start + ChronoDuration::days(i64::from(days)));
        if end <= start {
            return Response::error(ErrorCode::InvalidRequest, "range end must be after start");
        }
        let range = Interval::new(start, end);

        let identities = vec![identity];
        let result = with_auth_retry(
            || {
                self.schedule
                    .get_busy_intervals(&identities, range, AGENDA_GRANULARITY_MINUTES)
            },
            || self.client.renew_credentials(),
        )
        .await;

        match result {
            Ok(intervals) => Response::Agenda {
                intervals: intervals.iter().map(BusyIntervalView::from).collect(),
            },
            Err(err) => error_response(err),
        }
    }

    async fn handle_events(
        &self,
        days: u32,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Response {
        let tz = self.config.window.timezone;
        let start = from
            .map(|dt| dt.with_timezone(&tz))
            .unwrap_or_else(|| Utc::now().with_timezone(&tz));
        let end = to
            .map(|dt| dt.with_timezone(&tz))
            .unwrap_or_else(|| start + ChronoDuration::days(i64::from(days)));
        if end <= start {
            return Response::error(ErrorCode::InvalidRequest, "range end must be after start");
        }

        let result = with_auth_retry(
            || self.client.list_events(start, end),
            || self.client.renew_credentials(),
        )
        .await;

        match result {
            Ok(events) => Response::Events { events },
            Err(err) => error_response(err),
        }
    }
}

/// The queries the scheduler keeps warm.
fn default_requests() -> Vec<Request> {
    vec![
        Request::Events {
            days: 7,
            from: None,
            to: None,
        },
        Request::Messages {
            folder: "inbox".to_string(),
            limit: 20,
            unread: false,
        },
        Request::Contacts {
            limit: 100,
            search: None,
        },
        Request::FreeSlots {
            identities: Vec::new(),
            weeks: 1,
            min_duration_minutes: 30,
            limit: None,
            start_hour: None,
            end_hour: None,
            exclude_weekends: None,
        },
    ]
}

/// Derives the cache key for a request; `None` means "never cached".
fn cache_key_for(request: &Request) -> Option<String> {
    fn opt<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(T::to_string).unwrap_or_default()
    }

    match request {
        Request::FreeSlots {
            identities,
            weeks,
            min_duration_minutes,
            limit,
            start_hour,
            end_hour,
            exclude_weekends,
        } => Some(cache_key(
            "free",
            &[
                ("identities", identities.join(",")),
                ("weeks", weeks.to_string()),
                ("duration", min_duration_minutes.to_string()),
                ("limit", opt(limit)),
                ("start_hour", opt(start_hour)),
                ("end_hour", opt(end_hour)),
                ("exclude_weekends", opt(exclude_weekends)),
            ],
        )),
        Request::Agenda {
            identity,
            days,
            from,
            to,
        } => Some(cache_key(
            "agenda",
            &[
                ("identity", identity.clone()),
                ("days", days.to_string()),
                ("from", opt(&from.map(|dt| dt.to_rfc3339()))),
                ("to", opt(&to.map(|dt| dt.to_rfc3339()))),
            ],
        )),
        Request::Events { days, from, to } => Some(cache_key(
            "events",
            &[
                ("days", days.to_string()),
                ("from", opt(&from.map(|dt| dt.to_rfc3339()))),
                ("to", opt(&to.map(|dt| dt.to_rfc3339()))),
            ],
        )),
        Request::Messages {
            folder,
            limit,
            unread,
        } => Some(cache_key(
            "mail",
            &[
                ("folder", folder.clone()),
                ("limit", limit.to_string()),
                ("unread", unread.to_string()),
            ],
        )),
        Request::Contacts { limit, search } => Some(cache_key(
            "contacts",
            &[("limit", limit.to_string()), ("search", opt(search))],
        )),
        _ => None,
    }
}

/// Maps a source error to a protocol error response.
fn error_response(err: SourceError) -> Response {
    let code = match err.code() {
        SourceErrorCode::AuthenticationFailed => ErrorCode::AuthFailed,
        SourceErrorCode::NotFound => ErrorCode::NotFound,
        SourceErrorCode::NetworkError
        | SourceErrorCode::RateLimited
        | SourceErrorCode::ServerError => ErrorCode::SourceUnavailable,
        SourceErrorCode::InvalidResponse
        | SourceErrorCode::ConfigurationError
        | SourceErrorCode::InternalError => ErrorCode::Internal,
    };
    Response::error(code, err.to_string())
}
