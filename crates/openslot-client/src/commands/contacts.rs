//! `openslot contacts` - contact listing.

use openslot_protocol::{Request, Response};

use crate::commands::{CommandContext, unexpected_response};
use crate::error::ClientResult;
use crate::output;

/// Lists contacts, optionally filtered by a search string.
pub async fn list(ctx: &CommandContext, limit: usize, search: Option<String>) -> ClientResult<()> {
    let request = Request::Contacts { limit, search };

    match ctx.send(request).await? {
        Response::Contacts { contacts } => {
            if ctx.json {
                println!("{}", output::to_json(&contacts)?);
            } else {
                print!("{}", output::render_contacts(&contacts));
            }
            Ok(())
        }
        other => Err(unexpected_response(&other)),
    }
}
