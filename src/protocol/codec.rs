//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### State Update (reply to GET)
//! ```text
//! SU:TR=<int>;HR=<int>;DS=<0|1>;LS=<0|1>;PS=<0|1>;AS=<0|1>.
//! ```
//! Field order is fixed. Booleans are `0`/`1`, readings are decimal and may be
//! the `-1` sentinel.
//!
//! ### Acknowledgement (reply to SET)
//! ```text
//! OK
//! ```
//! No terminator follows.
//!
//! ### Controller Requests
//! Controllers send `GS.` and `SS:DS=1;LS=0;AS=1;.`; the second byte only
//! pads the prefix out to the fixed assignment offset.

use std::io::Write;

use crate::error::{HouseError, Result};
use crate::house::{Field, HouseState};
use super::command::{Assignment, PARAM_DELIM};
use super::frame::TERMINATOR;
use super::Response;

/// Acknowledgement for an applied SET
pub const ACK: &[u8] = b"OK";

/// Prefix of every state update
pub const STATE_UPDATE_PREFIX: &str = "SU:";

const GET_REQUEST: &[u8] = b"GS";
const SET_REQUEST_PREFIX: &[u8] = b"SS:";

// =============================================================================
// Response Encoding
// =============================================================================

/// Render a state update, terminator included
pub fn format_state_update(state: &HouseState) -> String {
    format!(
        "{}TR={};HR={};DS={};LS={};PS={};AS={}.",
        STATE_UPDATE_PREFIX,
        state.temperature,
        state.humidity,
        flag(state.door_open),
        flag(state.light_on),
        flag(state.proximity_detected),
        flag(state.alarm_on),
    )
}

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    match response {
        Response::StateUpdate(state) => format_state_update(state).into_bytes(),
        Response::Ack => ACK.to_vec(),
    }
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

// =============================================================================
// Request Encoding (controller side)
// =============================================================================

/// Encode a GET request
pub fn encode_get_request() -> Vec<u8> {
    let mut message = GET_REQUEST.to_vec();
    message.push(TERMINATOR);
    message
}

/// Encode a SET request using canonical `XX=V` tokens
pub fn encode_set_request(assignments: &[Assignment]) -> Vec<u8> {
    let mut message = Vec::with_capacity(SET_REQUEST_PREFIX.len() + assignments.len() * 5 + 1);
    message.extend_from_slice(SET_REQUEST_PREFIX);

    for assignment in assignments {
        message.extend_from_slice(assignment.field.state_key().as_bytes());
        message.push(b'=');
        message.push(if assignment.value { b'1' } else { b'0' });
        message.push(PARAM_DELIM);
    }

    message.push(TERMINATOR);
    message
}

// =============================================================================
// State Update Decoding (controller side)
// =============================================================================

/// Decode a state update frame back into a `HouseState`
///
/// The trailing terminator is optional. Unknown keys are ignored, but all six
/// known fields must be present.
pub fn decode_state_update(frame: &[u8]) -> Result<HouseState> {
    let text = std::str::from_utf8(frame)
        .map_err(|_| HouseError::Protocol("State update is not valid UTF-8".to_string()))?;
    let text = text.strip_suffix(TERMINATOR as char).unwrap_or(text);

    let body = text.strip_prefix(STATE_UPDATE_PREFIX).ok_or_else(|| {
        HouseError::Protocol(format!("Not a state update: {:?}", text))
    })?;

    let mut temperature = None;
    let mut humidity = None;
    let mut door = None;
    let mut light = None;
    let mut proximity = None;
    let mut alarm = None;

    for param in body.split(PARAM_DELIM as char).filter(|p| !p.is_empty()) {
        let (key, raw) = param.split_once('=').ok_or_else(|| {
            HouseError::Protocol(format!("State parameter without '=': {:?}", param))
        })?;
        let value: i32 = raw.parse().map_err(|_| {
            HouseError::Protocol(format!("Non-integer value for {}: {:?}", key, raw))
        })?;

        match key {
            "TR" => temperature = Some(value),
            "HR" => humidity = Some(value),
            "PS" => proximity = Some(value == 1),
            k if k == Field::Door.state_key() => door = Some(value == 1),
            k if k == Field::Light.state_key() => light = Some(value == 1),
            k if k == Field::Alarm.state_key() => alarm = Some(value == 1),
            other => tracing::trace!("Ignoring state key {}", other),
        }
    }

    Ok(HouseState {
        temperature: require(temperature, "TR")?,
        humidity: require(humidity, "HR")?,
        door_open: require(door, "DS")?,
        light_on: require(light, "LS")?,
        proximity_detected: require(proximity, "PS")?,
        alarm_on: require(alarm, "AS")?,
    })
}

fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| HouseError::Protocol(format!("State update missing {}", key)))
}
