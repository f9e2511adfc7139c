//! Daemon: socket server, response cache, refresh scheduler.
//!
//! The daemon owns a [`GroupwareClient`], a TTL [`ResponseCache`], and a
//! background [`Scheduler`]; the [`RequestHandler`] ties them together and
//! serves protocol requests over a Unix socket.
//!
//! [`GroupwareClient`]: openslot_providers::GroupwareClient

mod cache;
mod config;
mod error;
mod handler;
mod scheduler;
mod socket;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use openslot_providers::{GroupwareClient, GroupwareConfig};

pub use cache::{CacheEntry, ResponseCache, cache_key};
pub use config::{DEFAULT_GRANULARITY_MINUTES, ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerState};
pub use socket::{Connection, SocketServer, handle_connection};

/// Runs the daemon in the foreground until a `Shutdown` request arrives.
///
/// Wires the groupware client, response cache, request handler, socket
/// server, and background scheduler together.
pub async fn run_daemon(config: ServerConfig, groupware: GroupwareConfig) -> ServerResult<()> {
    let client = Arc::new(
        GroupwareClient::new(groupware).map_err(|e| ServerError::config(e.to_string()))?,
    );
    let cache = Arc::new(RwLock::new(ResponseCache::new(config.cache_ttl)));

    let scheduler_config = SchedulerConfig::new(config.refresh_interval, config.token_renew_interval);
    let handler = Arc::new(RequestHandler::new(config.clone(), client, cache));
    let shutdown = handler.shutdown_notify();

    let server = SocketServer::new(config).await?;
    info!(socket = %server.socket_path().display(), "daemon started");

    let scheduler = Scheduler::new(scheduler_config);
    let scheduler_task = tokio::spawn(scheduler.run(handler.clone(), shutdown.clone()));

    let result = server
        .run_until_shutdown(handler, shutdown.notified())
        .await;

    shutdown.notify_waiters();
    scheduler_task.abort();
    info!("daemon stopped");
    result
}
