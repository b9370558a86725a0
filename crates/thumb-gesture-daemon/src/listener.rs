//! Unix socket listener for thumb-wheel events.
//!
//! One event source is served at a time. Each connection is read in chunks,
//! split into lines, and every line is parsed and handed to the gesture
//! state machine in order. A malformed line is logged and skipped; only the
//! peer closing the socket (or shutdown) ends a connection.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thumb_gesture_protocol::{parse_message, LineFramer, ProtocolError, MAX_LINE_LEN};
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixSocket, UnixStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::DaemonError;
use crate::gesture::GestureMachine;
use crate::state::{ListenerState, StatusReporter};

/// Mode of the socket file: any local user may connect.
const ENDPOINT_MODE: u32 = 0o666;

/// Pending connections queued by the kernel: one event source at a time.
const LISTEN_BACKLOG: u32 = 1;

/// Pause after a failed accept so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How a served connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    PeerClosed,
    Shutdown,
}

/// A bound event endpoint.
pub struct EventListener {
    path: PathBuf,
    listener: UnixListener,
    status: StatusReporter,
}

impl EventListener {
    /// Remove any stale socket file at `path`, bind with a backlog of one, and
    /// open up permissions.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(path: &Path, status: StatusReporter) -> Result<Self, DaemonError> {
        let bind_error = |source| DaemonError::EndpointBind {
            path: path.to_path_buf(),
            source,
        };

        ensure_parent(path).map_err(bind_error)?;
        if remove_endpoint_file(path).map_err(bind_error)? {
            info!(path = %path.display(), "removed stale endpoint");
        }

        let socket = UnixSocket::new_stream().map_err(bind_error)?;
        socket.bind(path).map_err(bind_error)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_error)?;
        status.update(|s| s.listener = ListenerState::Bound);

        fs::set_permissions(path, fs::Permissions::from_mode(ENDPOINT_MODE))
            .map_err(bind_error)?;

        info!(path = %path.display(), "endpoint bound");
        Ok(Self {
            path: path.to_path_buf(),
            listener,
            status,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept and serve connections one at a time until shutdown.
    ///
    /// Returns early only on a fatal error from the gesture state machine.
    pub async fn serve(
        &self,
        gesture: &GestureMachine,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), DaemonError> {
        self.status.update(|s| s.listener = ListenerState::Listening);
        info!(path = %self.path.display(), "listening for thumb-wheel events");

        loop {
            let accepted = tokio::select! {
                () = shutdown_requested(shutdown) => None,
                accept = self.listener.accept() => Some(accept),
            };
            let Some(accept) = accepted else {
                break;
            };

            let stream = match accept {
                Ok((stream, _addr)) => stream,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            self.status.update(|s| {
                s.listener = ListenerState::Connected;
                s.connections_accepted += 1;
            });
            info!("event source connected");

            let end = self.serve_connection(stream, gesture, shutdown).await?;
            self.status.update(|s| s.listener = ListenerState::Listening);
            match end {
                ConnectionEnd::PeerClosed => info!("event source disconnected"),
                ConnectionEnd::Shutdown => break,
            }
        }

        debug!("accept loop stopped");
        Ok(())
    }

    /// Remove the socket file. A missing file is not an error.
    pub fn remove_endpoint(&self) -> Result<(), DaemonError> {
        remove_endpoint_file(&self.path)?;
        self.status.update(|s| s.listener = ListenerState::Closed);
        info!(path = %self.path.display(), "endpoint removed");
        Ok(())
    }

    async fn serve_connection(
        &self,
        mut stream: UnixStream,
        gesture: &GestureMachine,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionEnd, DaemonError> {
        let mut framer = LineFramer::new();
        let mut buf = [0u8; MAX_LINE_LEN];

        loop {
            let read = tokio::select! {
                () = shutdown_requested(shutdown) => None,
                read = stream.read(&mut buf) => Some(read),
            };
            let Some(read) = read else {
                if framer.pending() > 0 {
                    debug!(pending = framer.pending(), "dropping partial line on shutdown");
                }
                return Ok(ConnectionEnd::Shutdown);
            };

            match read {
                Ok(0) => {
                    if let Some(line) = framer.finish() {
                        self.dispatch(line, gesture).await?;
                    }
                    return Ok(ConnectionEnd::PeerClosed);
                }
                Ok(n) => {
                    for line in framer.push(&buf[..n]) {
                        self.dispatch(line, gesture).await?;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "read failed, dropping connection");
                    return Ok(ConnectionEnd::PeerClosed);
                }
            }
        }
    }

    async fn dispatch(
        &self,
        line: Result<String, ProtocolError>,
        gesture: &GestureMachine,
    ) -> Result<(), DaemonError> {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                self.reject(&e);
                return Ok(());
            }
        };
        if line.trim().is_empty() {
            return Ok(());
        }

        match parse_message(&line) {
            Ok(event) => {
                debug!(direction = %event.direction, magnitude = event.magnitude, "received event");
                gesture.handle_event(event).await?;
                self.status.update(|s| s.events_handled += 1);
            }
            Err(e) => self.reject(&e),
        }
        Ok(())
    }

    fn reject(&self, error: &ProtocolError) {
        warn!(error = %error, "ignoring malformed message");
        self.status.update(|s| s.malformed_lines += 1);
    }
}

/// Resolves once shutdown has been signalled (or the signal sender is gone).
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Returns whether a file was removed.
fn remove_endpoint_file(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
