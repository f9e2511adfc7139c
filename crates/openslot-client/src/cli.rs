//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// openslot - your groupware calendar, mail, and free slots at a glance
#[derive(Debug, Parser)]
#[command(name = "openslot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "OPENSLOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account to act as (overrides the configured default)
    #[arg(long, env = "OPENSLOT_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Path to the daemon socket
    #[arg(long, env = "OPENSLOT_SOCKET", global = true)]
    pub socket_path: Option<PathBuf>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calendar operations
    #[command(visible_alias = "cal")]
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Mail operations
    #[command(visible_alias = "m")]
    Mail {
        #[command(subcommand)]
        action: MailAction,
    },

    /// Contacts operations
    #[command(visible_alias = "c")]
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },

    /// Find free slots in your calendar
    Free(FreeArgs),

    /// View other people's availability
    #[command(visible_alias = "ppl")]
    People {
        #[command(subcommand)]
        action: PeopleAction,
    },

    /// Run the daemon in the foreground
    Serve,

    /// Show daemon status
    Status,

    /// Refresh the daemon's cached data
    Refresh {
        /// Drop the cache before refreshing
        #[arg(long)]
        force: bool,
    },
}

/// Calendar subcommands.
#[derive(Debug, Subcommand)]
pub enum CalendarAction {
    /// List events
    #[command(visible_alias = "ls")]
    List {
        /// Days ahead to list
        #[arg(long, default_value = "7")]
        days: u32,

        /// Range start (ISO 8601)
        #[arg(long)]
        from: Option<String>,

        /// Range end (ISO 8601)
        #[arg(long)]
        to: Option<String>,
    },

    /// Create an event
    Add {
        /// Event subject
        subject: String,

        /// Event start (ISO 8601)
        #[arg(long)]
        start: String,

        /// Event end (ISO 8601)
        #[arg(long)]
        end: String,

        /// Event location
        #[arg(long)]
        location: Option<String>,

        /// Event body text
        #[arg(long)]
        body: Option<String>,
    },

    /// Delete an event by ID
    #[command(visible_alias = "rm")]
    Delete {
        /// Provider event identifier
        id: String,
    },
}

/// Mail subcommands.
#[derive(Debug, Subcommand)]
pub enum MailAction {
    /// List messages
    #[command(visible_alias = "ls")]
    List {
        /// Folder to list
        #[arg(long, default_value = "inbox")]
        folder: String,

        /// Maximum number of messages
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Only unread messages
        #[arg(long)]
        unread: bool,
    },
}

/// Contacts subcommands.
#[derive(Debug, Subcommand)]
pub enum ContactsAction {
    /// List contacts
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of contacts
        #[arg(long, default_value = "100")]
        limit: usize,

        /// Filter by name or email substring
        #[arg(long)]
        search: Option<String>,
    },
}

/// Free-slot query options, shared by `free` and `people free/common`.
#[derive(Debug, Clone, Args)]
pub struct FreeArgs {
    /// Number of weeks to scan (1 = rest of the current week)
    #[arg(long, default_value = "1")]
    pub weeks: u32,

    /// Minimum slot duration in minutes
    #[arg(long, default_value = "30")]
    pub duration: i64,

    /// Maximum number of slots to return
    #[arg(long)]
    pub limit: Option<usize>,

    /// Working-day start hour (overrides config)
    #[arg(long)]
    pub start_hour: Option<u32>,

    /// Working-day end hour (overrides config)
    #[arg(long)]
    pub end_hour: Option<u32>,

    /// Include Saturdays and Sundays
    #[arg(long)]
    pub include_weekends: bool,
}

impl FreeArgs {
    /// Weekend override for the protocol: `None` keeps the config default.
    pub fn exclude_weekends(&self) -> Option<bool> {
        self.include_weekends.then_some(false)
    }
}

/// People subcommands.
#[derive(Debug, Subcommand)]
pub enum PeopleAction {
    /// Show a person's busy intervals
    Agenda {
        /// Person alias (from config) or email address
        who: String,

        /// Days ahead to look at
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Find free slots in a person's calendar
    Free {
        /// Person alias (from config) or email address
        who: String,

        #[command(flatten)]
        slots: FreeArgs,
    },

    /// Find common free slots across several people
    Common {
        /// Person aliases or email addresses (at least one)
        #[arg(required = true, num_args = 1..)]
        who: Vec<String>,

        #[command(flatten)]
        slots: FreeArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("CLI should parse")
    }

    #[test]
    fn free_defaults() {
        let cli = parse(&["openslot", "free"]);
        match cli.command {
            Command::Free(args) => {
                assert_eq!(args.weeks, 1);
                assert_eq!(args.duration, 30);
                assert_eq!(args.limit, None);
                assert!(!args.include_weekends);
                assert_eq!(args.exclude_weekends(), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn free_with_overrides() {
        let cli = parse(&[
            "openslot",
            "free",
            "--weeks",
            "2",
            "--duration",
            "45",
            "--limit",
            "3",
            "--start-hour",
            "8",
            "--include-weekends",
        ]);
        match cli.command {
            Command::Free(args) => {
                assert_eq!(args.weeks, 2);
                assert_eq!(args.duration, 45);
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.start_hour, Some(8));
                assert_eq!(args.exclude_weekends(), Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn people_common_requires_at_least_one_identity() {
        assert!(Cli::try_parse_from(["openslot", "people", "common"]).is_err());

        let cli = parse(&["openslot", "people", "common", "ada", "grace@example.com"]);
        match cli.command {
            Command::People {
                action: PeopleAction::Common { who, .. },
            } => assert_eq!(who, vec!["ada", "grace@example.com"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn calendar_aliases() {
        let cli = parse(&["openslot", "cal", "ls", "--days", "3"]);
        match cli.command {
            Command::Calendar {
                action: CalendarAction::List { days, .. },
            } => assert_eq!(days, 3),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags() {
        let cli = parse(&["openslot", "--json", "status"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Status));
    }
}
