//! House state store
//!
//! `HouseState` behind a `parking_lot::RwLock`.

use parking_lot::RwLock;

use crate::config::Config;
use crate::protocol::Assignment;
use super::{Field, HouseState};

/// The shared house
///
/// ## Concurrency:
/// - Snapshots take the read lock once and copy all six fields, so a reader
///   never sees a half-applied SET
/// - `apply` holds the write lock for the whole assignment list
pub struct House {
    state: RwLock<HouseState>,
}

impl House {
    /// Create a house with the legacy defaults
    pub fn new() -> Self {
        Self::with_state(HouseState::default())
    }

    /// Create a house starting from the given state
    pub fn with_state(state: HouseState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Create a house seeded with the configured sensor readings
    pub fn from_config(config: &Config) -> Self {
        Self::with_state(HouseState {
            temperature: config.initial_temperature,
            humidity: config.initial_humidity,
            proximity_detected: config.initial_proximity,
            ..HouseState::default()
        })
    }

    /// Consistent copy of every field
    pub fn snapshot(&self) -> HouseState {
        *self.state.read()
    }

    /// Apply assignments in order, returning the resulting state
    pub fn apply(&self, assignments: &[Assignment]) -> HouseState {
        let mut state = self.state.write();
        for assignment in assignments {
            state.set(assignment.field, assignment.value);
        }
        *state
    }

    /// Set a single writable field
    pub fn set_field(&self, field: Field, value: bool) {
        self.state.write().set(field, value);
    }
}

impl Default for House {
    fn default() -> Self {
        Self::new()
    }
}
