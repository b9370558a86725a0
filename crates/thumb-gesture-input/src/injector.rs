//! Key and button injection through the `ydotool` command-line utility.
//!
//! Each action is a short-lived subprocess bounded by a timeout. The child is
//! killed if the timeout elapses, so a hung injector cannot stall the caller.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thumb_gesture_types::{ButtonState, KeyCode, MouseButton};
use tokio::process::Command;
use tracing::debug;

use crate::error::InputError;
use crate::KeyInjector;

/// Default program name, resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "ydotool";

/// Default bound on a single injector invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// `ydotool click` flag for "button down".
const CLICK_DOWN: u8 = 0x40;
/// `ydotool click` flag for "button up".
const CLICK_UP: u8 = 0x80;

/// Injector backed by `ydotool key` / `ydotool click`.
#[derive(Debug, Clone)]
pub struct YdotoolInjector {
    program: String,
    timeout: Duration,
}

impl Default for YdotoolInjector {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_TIMEOUT)
    }
}

impl YdotoolInjector {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[String]) -> Result<(), InputError> {
        let command = format!("{} {}", self.program, args.join(" "));

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InputError::InjectorSpawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| InputError::InjectorSpawn {
                command: command.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                return Err(InputError::InjectorTimeout {
                    command,
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(InputError::InjectorExit {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(%command, "injector command completed");
        Ok(())
    }
}

#[async_trait]
impl KeyInjector for YdotoolInjector {
    async fn key(&mut self, code: KeyCode, state: ButtonState) -> Result<(), InputError> {
        self.run(&key_args(code, state)).await
    }

    async fn button(&mut self, button: MouseButton, state: ButtonState) -> Result<(), InputError> {
        self.run(&click_args(button, state)).await
    }
}

/// Arguments for `ydotool key`, e.g. `key 125:1`.
pub fn key_args(code: KeyCode, state: ButtonState) -> Vec<String> {
    let value = match state {
        ButtonState::Pressed => 1,
        ButtonState::Released => 0,
    };
    vec!["key".to_string(), format!("{}:{value}", code.0)]
}

/// Arguments for `ydotool click`, e.g. `click 0x42` (middle down).
pub fn click_args(button: MouseButton, state: ButtonState) -> Vec<String> {
    let id: u8 = match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    };
    let flag = match state {
        ButtonState::Pressed => CLICK_DOWN,
        ButtonState::Released => CLICK_UP,
    };
    vec!["click".to_string(), format!("{:#04x}", id | flag)]
}
