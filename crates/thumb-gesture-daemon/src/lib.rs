//! Core daemon for thumb-gesture.
//!
//! Implements the gesture state machine with its debounce timer, the Unix
//! socket listener that feeds it, and the lifecycle that ties startup and
//! shutdown together.

pub mod config;
pub mod daemon;
pub mod error;
pub mod gesture;
pub mod listener;
pub mod setup;
pub mod state;
pub mod timer;

pub use config::Config;
pub use daemon::{Daemon, ShutdownHandle};
pub use error::DaemonError;
pub use gesture::GestureMachine;
pub use state::DaemonStatus;
