//! House Module
//!
//! The shared record of the simulated house's sensor and actuator values.
//!
//! ## Responsibilities
//! - Hold the six state fields for the lifetime of the process
//! - Hand out consistent snapshots to readers
//! - Apply a whole SET assignment list atomically
//!
//! ## Writable Fields
//! Only the door, light and alarm can be changed over the wire. Temperature,
//! humidity and proximity are sensor readings, seeded at construction.

mod state;

pub use state::House;

/// Sentinel for a temperature or humidity reading that has never been taken
pub const UNKNOWN_READING: i32 = -1;

/// Point-in-time copy of every house field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseState {
    /// Temperature reading (`TR`)
    pub temperature: i32,

    /// Humidity reading (`HR`)
    pub humidity: i32,

    /// Door open (`DS`)
    pub door_open: bool,

    /// Light on (`LS`)
    pub light_on: bool,

    /// Proximity sensor triggered (`PS`)
    pub proximity_detected: bool,

    /// Alarm on (`AS`)
    pub alarm_on: bool,
}

impl Default for HouseState {
    fn default() -> Self {
        Self {
            temperature: UNKNOWN_READING,
            humidity: UNKNOWN_READING,
            door_open: false,
            light_on: false,
            proximity_detected: false,
            alarm_on: false,
        }
    }
}

/// A field that SET commands may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Door,
    Light,
    Alarm,
}

impl Field {
    /// Map a wire field code (first byte of an assignment token)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'D' => Some(Field::Door),
            b'L' => Some(Field::Light),
            b'A' => Some(Field::Alarm),
            _ => None,
        }
    }

    /// Two-letter state key used in state updates and canonical SET tokens
    pub fn state_key(&self) -> &'static str {
        match self {
            Field::Door => "DS",
            Field::Light => "LS",
            Field::Alarm => "AS",
        }
    }
}

impl HouseState {
    /// Read a writable field
    pub fn get(&self, field: Field) -> bool {
        match field {
            Field::Door => self.door_open,
            Field::Light => self.light_on,
            Field::Alarm => self.alarm_on,
        }
    }

    /// Write a writable field
    pub fn set(&mut self, field: Field, value: bool) {
        match field {
            Field::Door => self.door_open = value,
            Field::Light => self.light_on = value,
            Field::Alarm => self.alarm_on = value,
        }
    }
}
