//! Event protocol for thumb-gesture.
//!
//! The event source writes one `direction:magnitude` line per thumb-wheel
//! tick. This crate reassembles lines from a byte stream ([`LineFramer`])
//! and turns each line into a [`GestureEvent`](thumb_gesture_types::GestureEvent)
//! ([`parse_message`]).

pub mod error;
pub mod framing;
pub mod message;

pub use error::ProtocolError;
pub use framing::{LineFramer, MAX_LINE_LEN};
pub use message::{encode_message, parse_message};
