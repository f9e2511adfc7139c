//! `openslot status` and `openslot refresh`.

use openslot_protocol::{Request, Response};

use crate::commands::{CommandContext, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Shows daemon status.
pub async fn status(ctx: &CommandContext) -> ClientResult<()> {
    match ctx.send(Request::Status).await? {
        Response::Status { info } => {
            if ctx.json {
                println!("{}", output::to_json(&info)?);
            } else {
                print!("{}", output::render_status(&info));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}

/// Asks the daemon to refresh its cached data.
pub async fn refresh(ctx: &CommandContext, force: bool) -> ClientResult<()> {
    match ctx.send(Request::Refresh { force }).await? {
        Response::Ok => {
            if !ctx.json {
                println!("Refreshed.");
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}
