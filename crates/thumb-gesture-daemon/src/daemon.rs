//! Daemon lifecycle.
//!
//! Startup: the caller creates the virtual pointer and the injector, then
//! [`Daemon::run`] binds the endpoint and serves events. Shutdown runs every
//! cleanup step even when an earlier one fails: stop accepting, release the
//! gesture, remove the endpoint, close the virtual pointer.

use std::sync::Arc;

use thumb_gesture_input::{GestureEmitter, KeyInjector, PointerDevice};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::DaemonError;
use crate::gesture::{GestureMachine, GestureSettings};
use crate::listener::EventListener;
use crate::state::{DaemonStatus, StatusReporter};

/// Clonable trigger for a graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask the daemon to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// The thumb-gesture daemon.
pub struct Daemon {
    config: Config,
    gesture: GestureMachine,
    status: StatusReporter,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Daemon {
    /// Create a new daemon instance around already-created output channels.
    pub fn new(
        config: Config,
        injector: Box<dyn KeyInjector>,
        pointer: Box<dyn PointerDevice>,
    ) -> Self {
        let status = StatusReporter::new();
        let emitter =
            GestureEmitter::new(injector, pointer).with_settle_delay(config.gesture.settle_delay());
        let gesture = GestureMachine::new(
            emitter,
            GestureSettings::from(&config.gesture),
            status.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            gesture,
            status,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The gesture state machine driven by this daemon.
    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    /// Get a handle that stops [`run`](Self::run) when triggered.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Subscribe to status snapshots.
    pub fn status_receiver(&self) -> watch::Receiver<DaemonStatus> {
        self.status.subscribe()
    }

    /// Bind the endpoint and serve events until shutdown or a fatal error.
    ///
    /// Cleanup runs in both cases; the fatal error, if any, is returned after.
    pub async fn run(&mut self) -> Result<(), DaemonError> {
        let socket_path = self.config.daemon.socket_path.clone();
        info!(
            socket = %socket_path.display(),
            release_delay_ms = self.config.gesture.release_delay_ms,
            "daemon starting"
        );

        let listener = match EventListener::bind(&socket_path, self.status.clone()) {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, "failed to bind endpoint");
                self.shutdown(None).await;
                return Err(e);
            }
        };

        info!("daemon running");
        let result = listener.serve(&self.gesture, &mut self.shutdown_rx).await;
        if let Err(e) = &result {
            error!(error = %e, "stopping after fatal error");
        }

        self.shutdown(Some(&listener)).await;
        result
    }

    async fn shutdown(&self, listener: Option<&EventListener>) {
        info!("daemon shutting down");

        if self.gesture.force_end().await {
            info!("released held gesture");
        }

        if let Some(listener) = listener {
            if let Err(e) = listener.remove_endpoint() {
                warn!(error = %e, path = %listener.path().display(), "failed to remove endpoint");
            }
        }

        if let Err(e) = self.gesture.close_device().await {
            warn!(error = %e, "failed to close virtual pointer");
        }

        info!("daemon shut down complete");
    }
}
