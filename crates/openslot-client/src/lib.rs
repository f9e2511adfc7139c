//! CLI, socket client, output rendering.
//!
//! This crate provides the `openslot` command-line interface and the
//! socket client it uses to talk to the daemon.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod socket;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use socket::SocketClient;
