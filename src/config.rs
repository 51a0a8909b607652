//! Configuration for the IoT house
//!
//! Centralized configuration with sensible defaults.

use crate::error::{HouseError, Result};

/// Smallest frame bound the server accepts (legacy clients send up to ~1000 bytes)
pub const MIN_FRAME_SIZE: usize = 1000;

/// Main configuration for a house server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections (one worker thread each)
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Max bytes in one frame, terminator excluded
    pub max_frame_size: usize,

    // -------------------------------------------------------------------------
    // Initial Sensor Readings
    // -------------------------------------------------------------------------
    /// Temperature reported until something changes it (-1 = unknown)
    pub initial_temperature: i32,

    /// Humidity reported until something changes it (-1 = unknown)
    pub initial_humidity: i32,

    /// Whether the proximity sensor starts triggered
    pub initial_proximity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5050".to_string(),
            max_connections: 16,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            max_frame_size: 1024,
            initial_temperature: -1,
            initial_humidity: -1,
            initial_proximity: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration can run a server
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.trim().is_empty() {
            return Err(HouseError::Config("listen address is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(HouseError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size < MIN_FRAME_SIZE {
            return Err(HouseError::Config(format!(
                "max_frame_size must be at least {} bytes (got {})",
                MIN_FRAME_SIZE, self.max_frame_size
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the frame size bound (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the initial temperature reading
    pub fn initial_temperature(mut self, value: i32) -> Self {
        self.config.initial_temperature = value;
        self
    }

    /// Set the initial humidity reading
    pub fn initial_humidity(mut self, value: i32) -> Self {
        self.config.initial_humidity = value;
        self
    }

    /// Set whether the proximity sensor starts triggered
    pub fn initial_proximity(mut self, detected: bool) -> Self {
        self.config.initial_proximity = detected;
        self
    }

    /// Finish building the config
    pub fn build(self) -> Config {
        self.config
    }
}
