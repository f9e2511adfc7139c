//! Unix socket listener for IPC.
//!
//! An async Unix socket server speaking the openslot protocol. Each
//! connection gets a request loop; concurrency is bounded by a semaphore.

use std::path::Path;
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use openslot_protocol::{Envelope, Request, Response, read_frame, write_frame};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;

/// Unix socket server for handling client connections.
pub struct SocketServer {
    config: ServerConfig,
    listener: UnixListener,
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Binds to the socket path from the configuration.
    ///
    /// A stale socket file (no live daemon behind it) is removed when
    /// `cleanup_stale_socket` is set; a live one is an error.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let socket_path = &config.socket_path;

        if let Some(parent) = socket_path.parent()
            && !parent.exists()
        {
            return Err(ServerError::socket_path_invalid(
                parent.to_string_lossy().to_string(),
            ));
        }

        if config.cleanup_stale_socket && socket_path.exists() {
            match UnixStream::connect(socket_path).await {
                Ok(_) => {
                    return Err(ServerError::socket_in_use(
                        socket_path.to_string_lossy().to_string(),
                    ));
                }
                Err(_) => {
                    info!(path = %socket_path.display(), "removing stale socket");
                    std::fs::remove_file(socket_path)?;
                }
            }
        } else if socket_path.exists() {
            return Err(ServerError::socket_in_use(
                socket_path.to_string_lossy().to_string(),
            ));
        }

        let listener = UnixListener::bind(socket_path)?;
        info!(path = %socket_path.display(), "socket server listening");

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
        })
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Accepts a single connection.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self
            .connection_semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");

        let (stream, _addr) = self.listener.accept().await?;
        debug!("accepted connection");

        Ok(Connection {
            stream,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the accept loop until the shutdown future completes.
    pub async fn run_until_shutdown<S>(
        &self,
        handler: Arc<RequestHandler>,
        shutdown: S,
    ) -> ServerResult<()>
    where
        S: std::future::Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.accept_loop(handler) => result,
            _ = shutdown => {
                info!("shutdown signal received");
                Ok(())
            }
        }
    }

    async fn accept_loop(&self, handler: Arc<RequestHandler>) -> ServerResult<()> {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    let handler = handler.clone();
                    tokio::spawn(handle_connection(connection, handler));
                }
                Err(e) => {
                    // Keep accepting; one failed accept must not kill the daemon.
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        if self.config.socket_path.exists()
            && let Err(e) = std::fs::remove_file(&self.config.socket_path)
        {
            warn!(
                path = %self.config.socket_path.display(),
                error = %e,
                "failed to remove socket file"
            );
        }
    }
}

/// A client connection to the daemon.
pub struct Connection {
    stream: UnixStream,
    timeout: std::time::Duration,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl Connection {
    /// Reads a request envelope; `Ok(None)` on clean EOF.
    pub async fn read_request(&mut self) -> ServerResult<Option<Envelope<Request>>> {
        match tokio::time::timeout(self.timeout, read_frame(&mut self.stream)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "timed out reading request",
            ))),
        }
    }

    /// Writes a response envelope.
    pub async fn write_response(&mut self, envelope: &Envelope<Response>) -> ServerResult<()> {
        match tokio::time::timeout(self.timeout, write_frame(&mut self.stream, envelope)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "timed out writing response",
            ))),
        }
    }
}

/// Per-connection request loop.
pub async fn handle_connection(mut connection: Connection, handler: Arc<RequestHandler>) {
    loop {
        match connection.read_request().await {
            Ok(Some(envelope)) => {
                if !envelope.is_compatible() {
                    warn!(version = %envelope.protocol_version, "incompatible protocol version");
                }
                let response = handler.dispatch(envelope.payload).await;
                let reply = Envelope::response(envelope.request_id, response);
                if let Err(e) = connection.write_response(&reply).await {
                    warn!(error = %e, "failed to write response");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read request");
                break;
            }
        }
    }
}
