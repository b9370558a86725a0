//! Daemon errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to bind {}: {source}", path.display())]
    EndpointBind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("endpoint error: {0}")]
    Endpoint(#[from] std::io::Error),

    #[error("input error: {0}")]
    Input(#[from] thumb_gesture_input::InputError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DaemonError {
    /// Whether the daemon must stop rather than keep serving.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Input(e) => e.is_fatal(),
            Self::Endpoint(_) => false,
            Self::Config(_) | Self::EndpointBind { .. } | Self::Other(_) => true,
        }
    }
}
