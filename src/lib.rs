//! # IoT House
//!
//! A simulated smart house that serves its state over TCP:
//! - Temperature, humidity and proximity sensor readings
//! - Door, light and alarm actuators, switchable by controllers
//! - Plain-text `.`-framed GET/SET protocol on port 5050
//! - Shared state safe for many concurrent connections
//! - Controller-side client and a polling watcher
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (Accept loop + worker pool)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one Connection per socket
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Frame Reader                              │
//! │            (bytes up to '.', bounded size)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ frame
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Interpreter                               │
//! │          G → state update     S → assignments                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │    House    │
//!                │  (RwLock)   │
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod house;
pub mod protocol;
pub mod interpreter;
pub mod network;
pub mod client;
pub mod watch;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HouseError, Result};
pub use config::Config;
pub use house::{House, HouseState};
pub use interpreter::Interpreter;
pub use client::Client;
pub use watch::{PollOutcome, Watcher};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the house simulator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
