//! Response definitions
//!
//! Represents replies written back to controllers.

use crate::house::HouseState;

/// A reply to send to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Full state (answer to GET)
    StateUpdate(HouseState),

    /// Bare `OK` (answer to SET)
    Ack,
}

impl Response {
    /// Create a state update response
    pub fn state_update(state: HouseState) -> Self {
        Response::StateUpdate(state)
    }

    /// Create an acknowledgement
    pub fn ack() -> Self {
        Response::Ack
    }
}
