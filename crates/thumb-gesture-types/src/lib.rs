//! Shared types for thumb-gesture.
//!
//! This crate contains the types shared across the thumb-gesture workspace:
//! parsed gesture events, key and button codes understood by the injector,
//! and the descriptor of the virtual pointer device.

pub mod device;
pub mod event;

pub use device::{DeviceCapability, DeviceInfo, DEFAULT_VIRTUAL_POINTER_NAME};
pub use event::{
    ButtonState, Direction, GestureEvent, KeyCode, MouseButton, UnknownDirection,
};
