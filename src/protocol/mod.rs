//! Protocol Module
//!
//! Defines the plain-text wire protocol spoken between the house and its
//! controllers.
//!
//! ## Framing
//! Every request is a run of bytes ended by a `.` terminator, which is never
//! part of the frame. A state update response is framed the same way; the SET
//! acknowledgement is the bare two bytes `OK`.
//!
//! ### Requests
//! ```text
//! G<anything>.                     read the current state
//! S<2 bytes><tok>;<tok>;...;.      apply assignments, tok = XX=V
//! ```
//!
//! The assignment list always starts at byte 3 of the frame (`S: D=1;`,
//! `SS:DS=1;`). Nothing else about the prefix is checked.
//!
//! ### Responses
//! ```text
//! SU:TR=<int>;HR=<int>;DS=<0|1>;LS=<0|1>;PS=<0|1>;AS=<0|1>.
//! OK
//! ```
//!
//! Any other leading byte is an unknown command and gets no reply at all.

mod command;
mod response;
mod frame;
mod codec;

pub use command::{
    parse_assignments, Assignment, Command, CommandType, ASSIGNMENT_WIDTH, PARAM_DELIM,
    SET_ASSIGNMENTS_OFFSET, VALUE_OFFSET,
};
pub use response::Response;
pub use frame::{FrameReader, TERMINATOR};
pub use codec::{
    decode_state_update, encode_get_request, encode_response, encode_set_request,
    format_state_update, write_response, ACK, STATE_UPDATE_PREFIX,
};

/// Port the house listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 5050;
