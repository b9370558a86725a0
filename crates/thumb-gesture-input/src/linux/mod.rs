//! Linux backends (uinput via evdev).

mod pointer;

pub use pointer::UinputPointer;
