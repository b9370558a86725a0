//! Message format: `<direction>:<magnitude>`.
//!
//! `direction` is `left` or `right` (case-sensitive) and `magnitude` is a
//! positive decimal integer, e.g. `left:5`.

use thumb_gesture_types::{Direction, GestureEvent};

use crate::error::ProtocolError;

/// Parse one line into a gesture event.
///
/// Surrounding whitespace, including a trailing `\r`, is ignored.
pub fn parse_message(line: &str) -> Result<GestureEvent, ProtocolError> {
    let message = line.trim();

    let mut parts = message.split(':');
    let (Some(direction), Some(magnitude), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ProtocolError::MissingDelimiter {
            line: line.to_string(),
        });
    };

    let direction: Direction =
        direction
            .parse()
            .map_err(|_| ProtocolError::UnknownDirection {
                direction: direction.to_string(),
                line: line.to_string(),
            })?;

    let magnitude: u32 = magnitude
        .parse()
        .map_err(|_| ProtocolError::InvalidMagnitude {
            line: line.to_string(),
        })?;

    if magnitude == 0 {
        return Err(ProtocolError::ZeroMagnitude {
            line: line.to_string(),
        });
    }

    Ok(GestureEvent::new(direction, magnitude))
}

/// Encode an event as a newline-terminated message line.
pub fn encode_message(event: &GestureEvent) -> String {
    format!("{}:{}\n", event.direction, event.magnitude)
}
