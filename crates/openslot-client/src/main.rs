//! openslot CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use openslot_client::cli::{CalendarAction, Cli, Command, ContactsAction, MailAction, PeopleAction};
use openslot_client::commands::{self, CommandContext};
use openslot_client::config::ClientConfig;
use openslot_client::error::ClientResult;
use openslot_client::socket::SocketClient;
use openslot_core::{TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if matches!(cli.command, Command::Serve) {
        TracingConfig::daemon()
    } else if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Compact)
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    if let Command::Serve = cli.command {
        return commands::serve::run(&config, cli.account.as_deref(), cli.socket_path).await;
    }

    let socket_path = cli
        .socket_path
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(openslot_server::default_socket_path);
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.server.timeout));

    let ctx = CommandContext {
        client: SocketClient::new(socket_path, timeout),
        config,
        account: cli.account,
        json: cli.json,
    };

    match cli.command {
        Command::Calendar { action } => match action {
            CalendarAction::List { days, from, to } => {
                commands::calendar::list(&ctx, days, from.as_deref(), to.as_deref()).await
            }
            CalendarAction::Add {
                subject,
                start,
                end,
                location,
                body,
            } => commands::calendar::add(&ctx, &subject, &start, &end, location, body).await,
            CalendarAction::Delete { id } => commands::calendar::delete(&ctx, &id).await,
        },
        Command::Mail { action } => match action {
            MailAction::List {
                folder,
                limit,
                unread,
            } => commands::mail::list(&ctx, &folder, limit, unread).await,
        },
        Command::Contacts { action } => match action {
            ContactsAction::List { limit, search } => {
                commands::contacts::list(&ctx, limit, search).await
            }
        },
        Command::Free(args) => commands::free::run(&ctx, Vec::new(), &args).await,
        Command::People { action } => match action {
            PeopleAction::Agenda { who, days } => commands::people::agenda(&ctx, &who, days).await,
            PeopleAction::Free { who, slots } => {
                commands::people::free_slots(&ctx, &who, &slots).await
            }
            PeopleAction::Common { who, slots } => {
                commands::people::common(&ctx, &who, &slots).await
            }
        },
        Command::Status => commands::status::status(&ctx).await,
        Command::Refresh { force } => commands::status::refresh(&ctx, force).await,
        Command::Serve => unreachable!("handled above"),
    }
}
