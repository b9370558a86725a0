//! Input subsystem errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to spawn `{command}`: {reason}")]
    InjectorSpawn { command: String, reason: String },

    #[error("`{command}` timed out after {timeout:?}")]
    InjectorTimeout { command: String, timeout: Duration },

    #[error("`{command}` exited with {status}: {stderr}")]
    InjectorExit {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to create virtual device: {0}")]
    VirtualDeviceCreate(String),

    #[error("failed to write to virtual device: {0}")]
    DeviceWrite(String),

    #[error("virtual device is closed")]
    DeviceClosed,

    #[error("backend not available on this platform")]
    Unavailable,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InputError {
    /// Whether the error means the virtual device can no longer be trusted.
    ///
    /// Injector failures are soft: the next gesture gets a fresh command.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::VirtualDeviceCreate(_) | Self::DeviceWrite(_) | Self::DeviceClosed
        )
    }
}
