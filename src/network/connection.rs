//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::error::{HouseError, Result};
use crate::interpreter::Interpreter;
use crate::protocol::{write_response, FrameReader, Response};

/// Counters for one connection's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Frames read, unknown ones included
    pub frames: u64,

    /// Responses written
    pub responses: u64,

    /// Frames dropped as unknown commands
    pub unknown: u64,
}

/// Handles a single client connection
///
/// Generic over the stream halves so the frame loop can run on anything that
/// reads and writes bytes; `from_tcp` builds the socket-backed version.
pub struct Connection<R, W> {
    /// Frame reader over the inbound half
    frames: FrameReader<R>,

    /// Outbound half
    writer: W,

    /// Shared command interpreter
    interpreter: Interpreter,

    /// Peer address for logging
    peer_addr: String,

    stats: ConnectionStats,
}

impl Connection<BufReader<TcpStream>, BufWriter<TcpStream>> {
    /// Create a handler for an accepted socket
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn from_tcp(stream: TcpStream, interpreter: Interpreter, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Replies are tiny; don't let Nagle hold them back
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;

        Ok(Self::new(
            BufReader::new(read_stream),
            BufWriter::new(stream),
            interpreter,
            peer_addr,
            config.max_frame_size,
        ))
    }
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Create a connection handler over arbitrary stream halves
    pub fn new(
        reader: R,
        writer: W,
        interpreter: Interpreter,
        peer_addr: impl Into<String>,
        max_frame_size: usize,
    ) -> Self {
        Self {
            frames: FrameReader::new(reader, max_frame_size),
            writer,
            interpreter,
            peer_addr: peer_addr.into(),
            stats: ConnectionStats::default(),
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and sends responses.
    /// Returns when the client disconnects, a read times out, or a fatal error
    /// occurs. Oversized frames end the connection with `FrameTooLarge`.
    pub fn handle(&mut self) -> Result<ConnectionStats> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let frame = match self.frames.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(self.stats);
                }
                Err(HouseError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection {} closed by client: {}", self.peer_addr, e);
                    return Ok(self.stats);
                }
                Err(HouseError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(self.stats);
                }
                Err(e) => {
                    tracing::warn!("Closing connection {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            self.stats.frames += 1;

            let response = match self.interpreter.execute(&frame) {
                Ok(response) => response,
                Err(e @ HouseError::UnknownCommand(_)) => {
                    // No reply on the wire for unknown commands
                    self.stats.unknown += 1;
                    tracing::debug!("{} from {}, no reply sent", e, self.peer_addr);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error executing frame from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            if let Err(e) = self.send_response(&response) {
                if let HouseError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(self.stats);
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)?;
        self.stats.responses += 1;
        tracing::trace!("Sent {:?} to {}", response, self.peer_addr);
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Counters so far
    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}

// Windows reports TimedOut where Unix reports WouldBlock
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
