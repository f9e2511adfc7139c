//! Daemon configuration.

use std::path::PathBuf;
use std::time::Duration;

use openslot_core::WorkingWindowConfig;

/// Free/busy granularity requested from the availability source.
pub const DEFAULT_GRANULARITY_MINUTES: u32 = 15;

/// Daemon configuration, assembled by the CLI from the config file.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the Unix socket.
    pub socket_path: PathBuf,

    /// The account the daemon serves.
    pub account: String,

    /// Working-window defaults for free-slot queries.
    pub window: WorkingWindowConfig,

    /// Connection timeout.
    pub connection_timeout: Duration,

    /// Maximum concurrent connections.
    pub max_connections: usize,

    /// Whether to remove a stale socket file on startup.
    pub cleanup_stale_socket: bool,

    /// TTL for cached responses.
    pub cache_ttl: Duration,

    /// Interval between background refreshes of the default queries.
    pub refresh_interval: Duration,

    /// Interval between proactive OAuth token renewals.
    pub token_renew_interval: Duration,

    /// Free/busy granularity in minutes.
    pub granularity_minutes: u32,
}

impl ServerConfig {
    /// Creates a configuration for the given account with defaults.
    pub fn new(account: impl Into<String>, window: WorkingWindowConfig) -> Self {
        Self {
            socket_path: default_socket_path(),
            account: account.into(),
            window,
            connection_timeout: Duration::from_secs(30),
            max_connections: 100,
            cleanup_stale_socket: true,
            cache_ttl: Duration::from_secs(300),
            refresh_interval: Duration::from_secs(300),
            token_renew_interval: Duration::from_secs(3000),
            granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
        }
    }

    /// Builder: set the socket path.
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Builder: set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builder: set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Builder: set the background refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Returns the default socket path.
///
/// `$XDG_RUNTIME_DIR/openslot.sock` if available, otherwise
/// `/tmp/openslot-$UID.sock`.
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("openslot.sock")
    } else {
        #[cfg(unix)]
        let uid = unsafe { libc::getuid() };
        #[cfg(not(unix))]
        let uid = 0;
        PathBuf::from(format!("/tmp/openslot-{}.sock", uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new("me@example.com", WorkingWindowConfig::default());
        assert_eq!(config.account, "me@example.com");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.token_renew_interval, Duration::from_secs(3000));
        assert_eq!(config.granularity_minutes, 15);
        assert!(config.cleanup_stale_socket);
    }

    #[test]
    fn builders() {
        let config = ServerConfig::new("me@example.com", WorkingWindowConfig::default())
            .with_socket_path("/custom/openslot.sock")
            .with_connection_timeout(Duration::from_secs(5))
            .with_cache_ttl(Duration::from_secs(30));

        assert_eq!(config.socket_path, PathBuf::from("/custom/openslot.sock"));
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn default_socket_path_shape() {
        let path = default_socket_path();
        let text = path.to_string_lossy();
        assert!(text.contains("openslot"));
        assert!(text.ends_with(".sock"));
    }
}
