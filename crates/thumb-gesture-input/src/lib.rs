//! Synthetic input output channels for thumb-gesture.
//!
//! This crate defines the two side channels the daemon drives:
//!
//! - [`KeyInjector`]: presses and releases keys and mouse buttons through an
//!   external command ([`YdotoolInjector`]). Failures here are soft.
//! - [`PointerDevice`]: a virtual pointer that emits relative motion without
//!   touching the physical cursor (`linux::UinputPointer`). Failures here are
//!   fatal.
//!
//! [`GestureEmitter`] combines both into the start/move/end operations of the
//! pan gesture. Recording fakes live in `mock` behind the `mock` feature.

use async_trait::async_trait;
use thumb_gesture_types::{ButtonState, KeyCode, MouseButton};

pub mod emitter;
pub mod error;
pub mod injector;
#[cfg(feature = "linux")]
pub mod linux;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use emitter::GestureEmitter;
pub use error::InputError;
pub use injector::YdotoolInjector;

/// Presses and releases keys and buttons as seen by the compositor.
#[async_trait]
pub trait KeyInjector: Send + 'static {
    /// Press or release a key by Linux key code.
    async fn key(&mut self, code: KeyCode, state: ButtonState) -> Result<(), InputError>;

    /// Press-and-hold or release a mouse button.
    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError>;
}

/// A virtual pointer device that emits relative motion.
#[async_trait]
pub trait PointerDevice: Send + 'static {
    /// Emit one relative motion report and synchronise it.
    async fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError>;

    /// Unregister the device. Further moves fail with [`InputError::DeviceClosed`].
    async fn close(&mut self) -> Result<(), InputError>;
}
