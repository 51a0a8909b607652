//! Error types for the IoT house
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using HouseError
pub type Result<T> = std::result::Result<T, HouseError>;

/// Unified error type for IoT house operations
#[derive(Debug, Error)]
pub enum HouseError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Frame too large: exceeded {limit} bytes without a terminator")]
    FrameTooLarge { limit: usize },

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Unknown command: {}", describe_command_byte(.0))]
    UnknownCommand(Option<u8>),

    #[error("Malformed assignment: {0:?}")]
    MalformedAssignment(String),

    // -------------------------------------------------------------------------
    // Client-side Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HouseError {
    /// Whether the connection that produced this error must be closed
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, HouseError::Io(_) | HouseError::FrameTooLarge { .. })
    }
}

fn describe_command_byte(byte: &Option<u8>) -> String {
    match byte {
        Some(b) if b.is_ascii_graphic() => format!("'{}'", *b as char),
        Some(b) => format!("0x{:02x}", b),
        None => "empty frame".to_string(),
    }
}
