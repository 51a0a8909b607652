//! Command definitions
//!
//! Parses request frames into commands.

use crate::error::{HouseError, Result};
use crate::house::Field;

/// Byte offset where a SET frame's assignment list begins (`S: ` / `SS:`)
pub const SET_ASSIGNMENTS_OFFSET: usize = 3;

/// Width of a canonical `XX=V` assignment token
pub const ASSIGNMENT_WIDTH: usize = 4;

/// Offset of the value byte in a canonical token
pub const VALUE_OFFSET: usize = 3;

/// Separator ending each assignment token
pub const PARAM_DELIM: u8 = b';';

/// Command types, keyed by the first byte of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = b'G',
    Set = b'S',
}

impl CommandType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'G' => Some(CommandType::Get),
            b'S' => Some(CommandType::Set),
            _ => None,
        }
    }
}

/// One field update from a SET command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub field: Field,
    pub value: bool,
}

impl Assignment {
    pub fn new(field: Field, value: bool) -> Self {
        Self { field, value }
    }

    /// Parse one token (delimiter already stripped)
    ///
    /// Canonical tokens are `XX=V`: field code at byte 0, value at byte 3.
    /// The single-letter form `X=V` is also read, with the value at byte 2.
    /// Only `'1'` means on. Returns `Ok(None)` for a field code the house
    /// doesn't know.
    pub fn parse(token: &[u8]) -> Result<Option<Self>> {
        let (code, value) = if token.len() == ASSIGNMENT_WIDTH - 1 && token[1] == b'=' {
            (token[0], token[2])
        } else if token.len() >= ASSIGNMENT_WIDTH {
            (token[0], token[VALUE_OFFSET])
        } else {
            return Err(HouseError::MalformedAssignment(
                String::from_utf8_lossy(token).into_owned(),
            ));
        };

        Ok(Field::from_code(code).map(|field| Self::new(field, value == b'1')))
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report the full house state
    Get,

    /// Apply field updates in order
    Set { assignments: Vec<Assignment> },
}

impl Command {
    /// Parse a frame (terminator already stripped)
    ///
    /// Malformed SET tokens are logged and skipped; the rest still apply.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let first = frame.first().copied();

        match first.and_then(CommandType::from_byte) {
            Some(CommandType::Get) => Ok(Command::Get),
            Some(CommandType::Set) => {
                let list = frame.get(SET_ASSIGNMENTS_OFFSET..).unwrap_or(&[]);
                let mut assignments = Vec::new();

                for outcome in parse_assignments(list) {
                    match outcome {
                        Ok(Some(assignment)) => assignments.push(assignment),
                        Ok(None) => tracing::trace!("Ignoring unknown field code"),
                        Err(e) => tracing::warn!("Skipping token: {}", e),
                    }
                }

                Ok(Command::Set { assignments })
            }
            None => Err(HouseError::UnknownCommand(first)),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
        }
    }
}

/// Split an assignment list into per-token parse outcomes
///
/// Only `;`-terminated tokens count; anything after the last `;` is dropped.
pub fn parse_assignments(list: &[u8]) -> Vec<Result<Option<Assignment>>> {
    let mut tokens: Vec<&[u8]> = list.split(|b| *b == PARAM_DELIM).collect();
    // unterminated tail
    tokens.pop();

    tokens.into_iter().map(Assignment::parse).collect()
}
