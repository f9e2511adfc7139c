//! `openslot people` - other people's availability.

use openslot_protocol::{Request, Response};

use crate::cli::FreeArgs;
use crate::commands::{CommandContext, free, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Shows a person's busy intervals.
pub async fn agenda(ctx: &CommandContext, who: &str, days: u32) -> ClientResult<()> {
    let identity = ctx.config.resolve_person(who)?;
    let request = Request::Agenda {
        identity,
        days,
        from: None,
        to: None,
    };

    match ctx.send(request).await? {
        Response::Agenda { intervals } => {
            if ctx.json {
                println!("{}", output::to_json(&intervals)?);
            } else {
                print!("{}", output::render_agenda(&intervals));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}

/// Finds free slots in one person's calendar.
pub async fn free_slots(ctx: &CommandContext, who: &str, args: &FreeArgs) -> ClientResult<()> {
    let identity = ctx.config.resolve_person(who)?;
    free::run(ctx, vec![identity], args).await
}

/// Finds common free slots across several people.
pub async fn common(ctx: &CommandContext, who: &[String], args: &FreeArgs) -> ClientResult<()> {
    let identities = who
        .iter()
        .map(|alias| ctx.config.resolve_person(alias))
        .collect::<ClientResult<Vec<_>>>()?;
    free::run(ctx, identities, args).await
}
