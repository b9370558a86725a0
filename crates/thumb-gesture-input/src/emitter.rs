//! The pan gesture as a sequence of synthetic input actions.

use std::time::Duration;

use thumb_gesture_types::{ButtonState, KeyCode, MouseButton};
use tracing::{debug, info, warn};

use crate::error::InputError;
use crate::{KeyInjector, PointerDevice};

/// Pause between the modifier key and the mouse button.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(5);

/// Drives the compositor's Mod + middle-button drag.
///
/// Key and button actions go through the injector and never fail the
/// caller. Motion goes through the virtual pointer and its failures are
/// returned, since a broken device handle silently drops every later move.
pub struct GestureEmitter {
    injector: Box<dyn KeyInjector>,
    pointer: Box<dyn PointerDevice>,
    modifier: KeyCode,
    button: MouseButton,
    settle_delay: Duration,
}

impl GestureEmitter {
    pub fn new(injector: Box<dyn KeyInjector>, pointer: Box<dyn PointerDevice>) -> Self {
        Self {
            injector,
            pointer,
            modifier: KeyCode::LEFT_META,
            button: MouseButton::Middle,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Press the modifier, then press and hold the drag button.
    pub async fn start_gesture(&mut self) {
        let result = self.injector.key(self.modifier, ButtonState::Pressed).await;
        log_soft_failure("press modifier", result);

        tokio::time::sleep(self.settle_delay).await;

        let result = self.injector.button(self.button, ButtonState::Pressed).await;
        log_soft_failure("press drag button", result);
    }

    /// Release the drag button, then the modifier. Mirrors [`start_gesture`](Self::start_gesture).
    pub async fn end_gesture(&mut self) {
        let result = self
            .injector
            .button(self.button, ButtonState::Released)
            .await;
        log_soft_failure("release drag button", result);

        tokio::time::sleep(self.settle_delay).await;

        let result = self.injector.key(self.modifier, ButtonState::Released).await;
        log_soft_failure("release modifier", result);
    }

    /// Move the virtual pointer horizontally by `dx` pixels.
    pub async fn move_horizontal(&mut self, dx: i32) -> Result<(), InputError> {
        self.pointer.move_relative(dx, 0).await?;
        debug!(dx, "moved virtual pointer");
        Ok(())
    }

    /// Unregister the virtual pointer.
    pub async fn close(&mut self) -> Result<(), InputError> {
        self.pointer.close().await?;
        info!("virtual pointer closed");
        Ok(())
    }
}

fn log_soft_failure(action: &str, result: Result<(), InputError>) {
    if let Err(e) = result {
        warn!(action, error = %e, "injector action failed");
    }
}
