//! `openslot calendar` - event listing and CRUD.

use openslot_protocol::{Request, Response};

use crate::commands::{CommandContext, parse_instant, parse_instant_utc, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Lists events for the coming days or an explicit range.
pub async fn list(
    ctx: &CommandContext,
    days: u32,
    from: Option<&str>,
    to: Option<&str>,
) -> ClientResult<()> {
    let tz = ctx.timezone()?;
    let request = Request::Events {
        days,
        from: parse_instant_utc(from, tz)?,
        to: parse_instant_utc(to, tz)?,
    };

    match ctx.send(request).await? {
        Response::Events { events } => {
            if ctx.json {
                println!("{}", output::to_json(&events)?);
            } else {
                print!("{}", output::render_events(&events));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}

/// Creates an event.
pub async fn add(
    ctx: &CommandContext,
    subject: &str,
    start: &str,
    end: &str,
    location: Option<String>,
    body: Option<String>,
) -> ClientResult<()> {
    let tz = ctx.timezone()?;
    let request = Request::CreateEvent {
        subject: subject.to_string(),
        start: parse_instant(start, tz)?.fixed_offset(),
        end: parse_instant(end, tz)?.fixed_offset(),
        location,
        body,
    };

    match ctx.send(request).await? {
        Response::EventCreated { event } => {
            if ctx.json {
                println!("{}", output::to_json(&event)?);
            } else {
                println!("Created '{}' (id: {})", event.subject, event.id);
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}

/// Deletes an event by provider ID.
pub async fn delete(ctx: &CommandContext, id: &str) -> ClientResult<()> {
    match ctx.send(Request::DeleteEvent { id: id.to_string() }).await? {
        Response::Deleted { id } => {
            if ctx.json {
                println!("{}", output::to_json(&serde_json::json!({ "deleted": id }))?);
            } else {
                println!("Deleted {id}");
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}
