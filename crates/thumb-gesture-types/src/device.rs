//! Device descriptor types.

/// Name the virtual pointer registers under unless configured otherwise.
pub const DEFAULT_VIRTUAL_POINTER_NAME: &str = "thumb-gesture-virtual-pointer";

/// Describes a virtual input device to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Human-readable name, distinct from any physical device.
    pub name: String,
    /// What this device can do.
    pub capabilities: Vec<DeviceCapability>,
}

impl DeviceInfo {
    /// A pointer with relative X/Y motion and left/middle/right buttons.
    pub fn virtual_pointer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: vec![DeviceCapability::RelativeMotion, DeviceCapability::Buttons],
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::virtual_pointer(DEFAULT_VIRTUAL_POINTER_NAME)
    }
}

/// What kind of input a device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    /// REL_X and REL_Y.
    RelativeMotion,
    /// BTN_LEFT, BTN_MIDDLE and BTN_RIGHT.
    Buttons,
}
