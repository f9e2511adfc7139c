//! Per-subcommand request building and rendering.

pub mod calendar;
pub mod contacts;
pub mod free;
pub mod mail;
pub mod people;
pub mod serve;
pub mod status;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use openslot_protocol::{Request, Response};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::socket::SocketClient;

/// Everything a command needs: the socket client, the loaded config, the
/// account override, and the output mode.
pub struct CommandContext {
    /// The daemon connection.
    pub client: SocketClient,
    /// The loaded configuration.
    pub config: ClientConfig,
    /// CLI account override, if any.
    pub account: Option<String>,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl CommandContext {
    /// Sends a request, turning daemon error responses into errors.
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        match self.client.send(request).await? {
            Response::Error { error } => Err(ClientError::Daemon {
                code: error.code.as_str().to_string(),
                message: error.message,
            }),
            response => Ok(response),
        }
    }

    /// Returns the validated working timezone.
    pub fn timezone(&self) -> ClientResult<Tz> {
        self.config.timezone()
    }
}

/// Builds the error for a response of the wrong kind.
pub fn unexpected_response(response: &Response) -> ClientError {
    let kind = serde_json::to_value(response)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
        .unwrap_or_else(|| "unknown".to_string());
    ClientError::UnexpectedResponse(kind)
}

/// Parses an ISO 8601 instant in the working timezone.
///
/// Accepts a full RFC 3339 timestamp, a local `YYYY-MM-DDTHH:MM[:SS]`
/// wall-clock time, or a bare date (midnight).
pub fn parse_instant(text: &str, tz: Tz) -> ClientResult<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).expect("valid time"))
        })
        .map_err(|_| {
            ClientError::invalid_argument(format!(
                "cannot parse '{text}' as an ISO 8601 date or datetime"
            ))
        })?;

    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ClientError::invalid_argument(format!("'{text}' does not exist in timezone {tz}"))
    })
}

/// Parses an optional ISO 8601 instant into the protocol's UTC form.
pub fn parse_instant_utc(text: Option<&str>, tz: Tz) -> ClientResult<Option<DateTime<Utc>>> {
    text.map(|t| parse_instant(t, tz).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_instant("2025-03-03T09:00:00+00:00", Berlin).unwrap();
        assert_eq!(dt, Berlin.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_local_wall_clock() {
        let dt = parse_instant("2025-03-03T09:00", Berlin).unwrap();
        assert_eq!(dt, Berlin.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());

        let with_seconds = parse_instant("2025-03-03T09:00:30", Berlin).unwrap();
        assert_eq!(
            with_seconds,
            Berlin.with_ymd_and_hms(2025, 3, 3, 9, 0, 30).unwrap()
        );
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_instant("2025-03-03", Berlin).unwrap();
        assert_eq!(dt, Berlin.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_instant("next tuesday", Berlin).is_err());
    }

    #[test]
    fn optional_utc_conversion() {
        assert_eq!(parse_instant_utc(None, Berlin).unwrap(), None);
        let dt = parse_instant_utc(Some("2025-03-03T09:00"), Berlin)
            .unwrap()
            .unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap());
    }
}
