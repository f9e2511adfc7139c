//! Unix socket client for talking to the openslot daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use openslot_protocol::{Envelope, Request, Response, read_frame, write_frame};

use crate::error::{ClientError, ClientResult};

/// Client for the daemon's Unix socket.
pub struct SocketClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketClient {
    /// Creates a new socket client.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    /// Creates a socket client with the default socket path.
    pub fn with_defaults() -> Self {
        Self::new(openslot_server::default_socket_path(), Duration::from_secs(5))
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a request and waits for the correlated response.
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(&request_id, request);

        debug!(
            socket = %self.socket_path.display(),
            request_id = %request_id,
            "connecting to daemon"
        );

        let mut stream =
            tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
                .await
                .map_err(|_| ClientError::Timeout("connecting to the daemon".into()))?
                .map_err(|e| {
                    ClientError::Connection(format!(
                        "cannot reach the daemon at {} ({e}); is `openslot serve` running?",
                        self.socket_path.display()
                    ))
                })?;

        tokio::time::timeout(self.timeout, write_frame(&mut stream, &envelope))
            .await
            .map_err(|_| ClientError::Timeout("sending the request".into()))??;

        let response: Option<Envelope<Response>> =
            tokio::time::timeout(self.timeout, read_frame(&mut stream))
                .await
                .map_err(|_| ClientError::Timeout("waiting for the response".into()))??;

        let response = response.ok_or_else(|| {
            ClientError::Connection("daemon closed the connection without replying".into())
        })?;

        if response.request_id != request_id {
            warn!(
                expected = %request_id,
                received = %response.request_id,
                "response request_id mismatch"
            );
        }

        Ok(response.payload)
    }
}
