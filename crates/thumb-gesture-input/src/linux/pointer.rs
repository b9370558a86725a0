//! uinput-based virtual pointer for Linux.

use async_trait::async_trait;
use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, EventType, KeyCode as EvdevKey, RelativeAxisCode};
use thumb_gesture_types::{DeviceCapability, DeviceInfo};
use tracing::{info, trace};

use crate::error::InputError;
use crate::PointerDevice;

/// Virtual pointer registered through `/dev/uinput`.
///
/// Motion written here reaches the compositor as a separate device, so the
/// physical cursor position is left alone.
pub struct UinputPointer {
    name: String,
    device: Option<VirtualDevice>,
}

impl UinputPointer {
    /// Register the virtual device described by `info`.
    pub fn create(info: &DeviceInfo) -> Result<Self, InputError> {
        let device = build_virtual_device(info)?;
        info!(name = %info.name, "created virtual pointer");
        Ok(Self {
            name: info.name.clone(),
            device: Some(device),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn build_virtual_device(info: &DeviceInfo) -> Result<VirtualDevice, InputError> {
    let mut builder = VirtualDevice::builder()
        .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
        .name(&info.name);

    for cap in &info.capabilities {
        match cap {
            DeviceCapability::Buttons => {
                let mut keys = AttributeSet::<EvdevKey>::new();
                keys.insert(EvdevKey::BTN_LEFT);
                keys.insert(EvdevKey::BTN_MIDDLE);
                keys.insert(EvdevKey::BTN_RIGHT);
                builder = builder
                    .with_keys(&keys)
                    .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?;
            }
            DeviceCapability::RelativeMotion => {
                let mut rel = AttributeSet::<RelativeAxisCode>::new();
                rel.insert(RelativeAxisCode::REL_X);
                rel.insert(RelativeAxisCode::REL_Y);
                builder = builder
                    .with_relative_axes(&rel)
                    .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?;
            }
        }
    }

    builder
        .build()
        .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))
}

#[async_trait]
impl PointerDevice for UinputPointer {
    async fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        let device = self.device.as_mut().ok_or(InputError::DeviceClosed)?;

        let events = relative_motion_events(dx, dy);
        if !events.is_empty() {
            // `emit` terminates the batch with SYN_REPORT.
            device
                .emit(&events)
                .map_err(|e| InputError::DeviceWrite(e.to_string()))?;
        }
        trace!(dx, dy, name = %self.name, "emitted relative motion");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), InputError> {
        if self.device.take().is_some() {
            info!(name = %self.name, "destroyed virtual pointer");
        }
        Ok(())
    }
}

/// Relative motion as evdev events, skipping zero axes.
fn relative_motion_events(dx: i32, dy: i32) -> Vec<evdev::InputEvent> {
    let mut events = Vec::with_capacity(2);
    if dx != 0 {
        events.push(evdev::InputEvent::new(
            EventType::RELATIVE.0,
            RelativeAxisCode::REL_X.0,
            dx,
        ));
    }
    if dy != 0 {
        events.push(evdev::InputEvent::new(
            EventType::RELATIVE.0,
            RelativeAxisCode::REL_Y.0,
            dy,
        ));
    }
    events
}
