//! Gesture event types.
//!
//! Platform-agnostic representations of thumb-wheel ticks and of the key and
//! button actions used to hold the pan gesture.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A single thumb-wheel tick reported by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub direction: Direction,
    /// Scroll amount, always greater than zero.
    pub magnitude: u32,
}

impl GestureEvent {
    pub fn new(direction: Direction, magnitude: u32) -> Self {
        Self {
            direction,
            magnitude,
        }
    }

    /// Signed horizontal displacement for this tick.
    ///
    /// Rightward scroll is positive. Saturates at the `i32` bounds.
    pub fn displacement(&self, pixels_per_tick: u32) -> i32 {
        let pixels = u64::from(self.magnitude) * u64::from(pixels_per_tick);
        let pixels = i32::try_from(pixels).unwrap_or(i32::MAX);
        match self.direction {
            Direction::Left => -pixels,
            Direction::Right => pixels,
        }
    }
}

/// Horizontal scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction: {0:?}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    /// Case-sensitive: only `left` and `right` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// Button/key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Linux input-event key code (as in `linux/input-event-codes.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// The Super/Mod key the compositor binds the pan gesture to.
    pub const LEFT_META: Self = Self(125);
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
