//! Daemon configuration loaded from TOML.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thumb_gesture_types::DEFAULT_VIRTUAL_POINTER_NAME;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub injector: InjectorConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Endpoint and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            log_level: default_log_level(),
        }
    }
}

/// Gesture timing and sensitivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Idle time after the last tick before the gesture is released.
    #[serde(default = "default_release_delay_ms")]
    pub release_delay_ms: u64,
    /// Horizontal pixels per unit of scroll magnitude.
    #[serde(default = "default_pixels_per_tick")]
    pub pixels_per_tick: u32,
    /// Pause between the modifier key and the mouse button.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            release_delay_ms: default_release_delay_ms(),
            pixels_per_tick: default_pixels_per_tick(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl GestureConfig {
    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// External key/button injector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectorConfig {
    #[serde(default = "default_injector_program")]
    pub program: String,
    #[serde(default = "default_injector_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            program: default_injector_program(),
            timeout_ms: default_injector_timeout_ms(),
        }
    }
}

impl InjectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Virtual pointer device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    std::env::temp_dir().join("thumb-gesture.sock")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_release_delay_ms() -> u64 {
    150
}

fn default_pixels_per_tick() -> u32 {
    30
}

fn default_settle_delay_ms() -> u64 {
    5
}

fn default_injector_program() -> String {
    "ydotool".to_string()
}

fn default_injector_timeout_ms() -> u64 {
    1000
}

fn default_device_name() -> String {
    DEFAULT_VIRTUAL_POINTER_NAME.to_string()
}
