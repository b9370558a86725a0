//! Mock input backends for testing.
//!
//! [`MockInjector`] and [`MockPointer`] share one timeline so tests can check
//! ordering across both channels (no motion before the button is held).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thumb_gesture_types::{ButtonState, KeyCode, MouseButton};

use crate::error::InputError;
use crate::{KeyInjector, PointerDevice};

/// One action observed by the mock backends, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Key { code: KeyCode, state: ButtonState },
    Button { button: MouseButton, state: ButtonState },
    Move { dx: i32, dy: i32 },
    Close,
}

#[derive(Debug, Default)]
struct MockInputState {
    actions: Vec<RecordedAction>,
    fail_injector: bool,
    fail_pointer: bool,
    closed: bool,
}

/// Create a mock injector, a mock pointer and an observer handle sharing state.
pub fn mock_backends() -> (MockInjector, MockPointer, MockInputHandle) {
    let state = Arc::new(Mutex::new(MockInputState::default()));
    (
        MockInjector {
            state: Arc::clone(&state),
        },
        MockPointer {
            state: Arc::clone(&state),
        },
        MockInputHandle { state },
    )
}

// ---------------------------------------------------------------------------
// MockInjector
// ---------------------------------------------------------------------------

/// Records key and button actions. Attempts are recorded even when failing.
pub struct MockInjector {
    state: Arc<Mutex<MockInputState>>,
}

impl MockInjector {
    fn record(&self, action: RecordedAction) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        let command = format!("{action:?}");
        state.actions.push(action);
        if state.fail_injector {
            return Err(InputError::InjectorExit {
                command,
                status: "exit status: 1".to_string(),
                stderr: "mock injector failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyInjector for MockInjector {
    async fn key(&mut self, code: KeyCode, state: ButtonState) -> Result<(), InputError> {
        self.record(RecordedAction::Key { code, state })
    }

    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError> {
        self.record(RecordedAction::Button { button, state })
    }
}

// ---------------------------------------------------------------------------
// MockPointer
// ---------------------------------------------------------------------------

/// Records relative motion. Failed writes are not recorded.
pub struct MockPointer {
    state: Arc<Mutex<MockInputState>>,
}

#[async_trait]
impl PointerDevice for MockPointer {
    async fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(InputError::DeviceClosed);
        }
        if state.fail_pointer {
            return Err(InputError::DeviceWrite("mock pointer failure".to_string()));
        }
        state.actions.push(RecordedAction::Move { dx, dy });
        Ok(())
    }

    async fn close(&mut self) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.actions.push(RecordedAction::Close);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockInputHandle
// ---------------------------------------------------------------------------

/// Clonable observer handle for the mock backends.
#[derive(Clone)]
pub struct MockInputHandle {
    state: Arc<Mutex<MockInputState>>,
}

impl MockInputHandle {
    /// Snapshot of every recorded action.
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.state.lock().unwrap().actions.clone()
    }

    /// Horizontal displacements, in order.
    pub fn moves(&self) -> Vec<i32> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                RecordedAction::Move { dx, .. } => Some(dx),
                _ => None,
            })
            .collect()
    }

    /// Number of key and button actions (injector invocations).
    pub fn injector_calls(&self) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, RecordedAction::Key { .. } | RecordedAction::Button { .. }))
            .count()
    }

    /// Number of times the drag button was pressed.
    pub fn gesture_starts(&self) -> usize {
        self.count_button(ButtonState::Pressed)
    }

    /// Number of times the drag button was released.
    pub fn gesture_ends(&self) -> usize {
        self.count_button(ButtonState::Released)
    }

    /// Check if `close()` was called on the pointer.
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Make every injector call fail with a nonzero exit.
    pub fn set_injector_failure(&self, fail: bool) {
        self.state.lock().unwrap().fail_injector = fail;
    }

    /// Make every pointer write fail.
    pub fn set_pointer_failure(&self, fail: bool) {
        self.state.lock().unwrap().fail_pointer = fail;
    }

    fn count_button(&self, wanted: ButtonState) -> usize {
        self.actions()
            .iter()
            .filter(|a| {
                matches!(a, RecordedAction::Button { button: MouseButton::Middle, state } if *state == wanted)
            })
            .count()
    }
}
