//! `openslot free` and the slot-query core of the `people` commands.

use openslot_protocol::{Request, Response};

use crate::cli::FreeArgs;
use crate::commands::{CommandContext, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Runs a free-slot query for the given identities (empty = own account).
pub async fn run(ctx: &CommandContext, identities: Vec<String>, args: &FreeArgs) -> ClientResult<()> {
    let request = Request::FreeSlots {
        identities,
        weeks: args.weeks,
        min_duration_minutes: args.duration,
        limit: args.limit,
        start_hour: args.start_hour,
        end_hour: args.end_hour,
        exclude_weekends: args.exclude_weekends(),
    };

    match ctx.send(request).await? {
        Response::Slots { slots } => {
            if ctx.json {
                println!("{}", output::to_json(&slots)?);
            } else {
                print!("{}", output::render_slots(&slots));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}
