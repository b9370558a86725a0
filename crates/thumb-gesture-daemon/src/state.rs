//! Gesture and listener state.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

/// Whether the pan gesture is currently held.
///
/// Owned by [`GestureMachine`](crate::gesture::GestureMachine) and only
/// touched under its lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureState {
    active: bool,
    last_activity: Option<Instant>,
}

impl GestureState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// Mark the gesture active. Returns `false` if it already was.
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.active, true)
    }

    /// Mark the gesture inactive. Returns `false` if it already was.
    pub fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Record activity now.
    pub fn touch(&mut self) {
        self.last_activity = Some(Instant::now());
    }
}

/// Lifecycle of the socket listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerState {
    /// No socket yet.
    #[default]
    Unbound,
    /// Socket file created, not yet accepting.
    Bound,
    /// Waiting for the event source to connect.
    Listening,
    /// Reading messages from a connected event source.
    Connected,
    /// Stopped; the socket file has been removed.
    Closed,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbound => write!(f, "Unbound"),
            Self::Bound => write!(f, "Bound"),
            Self::Listening => write!(f, "Listening"),
            Self::Connected => write!(f, "Connected"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Snapshot of daemon activity, published on a watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonStatus {
    pub listener: ListenerState,
    pub gesture_active: bool,
    pub gestures_started: u64,
    pub connections_accepted: u64,
    pub events_handled: u64,
    pub malformed_lines: u64,
}

/// Shared publisher of [`DaemonStatus`] updates.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: Arc<watch::Sender<DaemonStatus>>,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DaemonStatus::default());
        Self { tx: Arc::new(tx) }
    }

    /// Apply `f` to the current status and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut DaemonStatus)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<DaemonStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> DaemonStatus {
        self.tx.borrow().clone()
    }
}
