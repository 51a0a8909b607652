//! Interpreter Module
//!
//! Executes request frames against the shared house.
//!
//! ## Responsibilities
//! - Decide the command kind from the first byte of a frame
//! - Serve GET from one consistent snapshot
//! - Apply a SET's assignment list in a single write
//!
//! The interpreter holds no per-connection state; one instance can be shared
//! by every connection.

use std::sync::Arc;

use crate::error::Result;
use crate::house::House;
use crate::protocol::{Command, Response};

/// Runs commands against a house
#[derive(Clone)]
pub struct Interpreter {
    house: Arc<House>,
}

impl Interpreter {
    pub fn new(house: Arc<House>) -> Self {
        Self { house }
    }

    /// Execute one frame (terminator already stripped)
    ///
    /// Fails with `UnknownCommand` when the frame is neither GET nor SET; the
    /// caller must not write anything back in that case.
    pub fn execute(&self, frame: &[u8]) -> Result<Response> {
        tracing::debug!("Message received: {}", String::from_utf8_lossy(frame));

        let command = Command::parse(frame)?;
        Ok(self.execute_command(command))
    }

    /// Execute an already parsed command
    pub fn execute_command(&self, command: Command) -> Response {
        match command {
            Command::Get => Response::state_update(self.house.snapshot()),
            Command::Set { assignments } => {
                let state = self.house.apply(&assignments);
                tracing::debug!(
                    "Applied {} assignment(s), door={} light={} alarm={}",
                    assignments.len(),
                    state.door_open,
                    state.light_on,
                    state.alarm_on
                );
                Response::ack()
            }
        }
    }

    /// Get the shared house
    pub fn house(&self) -> &Arc<House> {
        &self.house
    }
}
