//! `openslot mail` - message listing.

use openslot_protocol::{Request, Response};

use crate::commands::{CommandContext, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Lists messages in a folder.
pub async fn list(ctx: &CommandContext, folder: &str, limit: usize, unread: bool) -> ClientResult<()> {
    let request = Request::Messages {
        folder: folder.to_string(),
        limit,
        unread,
    };

    match ctx.send(request).await? {
        Response::Messages { messages } => {
            if ctx.json {
                println!("{}", output::to_json(&messages)?);
            } else {
                print!("{}", output::render_messages(&messages));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}
