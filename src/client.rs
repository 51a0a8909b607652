//! Client Module
//!
//! Blocking controller-side connection to a house.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{HouseError, Result};
use crate::house::HouseState;
use crate::protocol::{
    decode_state_update, encode_get_request, encode_set_request, Assignment, FrameReader, ACK,
};

/// Largest state update the client will accept
const MAX_RESPONSE_SIZE: usize = 1024;

/// A connection to a house
pub struct Client {
    frames: FrameReader<BufReader<TcpStream>>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a house; `timeout` bounds the connect and every read/write
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| HouseError::Network("address resolved to nothing".to_string()))?;

        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        tracing::debug!("Connected to house at {}", addr);

        let read_stream = stream.try_clone()?;
        Ok(Self {
            frames: FrameReader::new(BufReader::new(read_stream), MAX_RESPONSE_SIZE),
            writer: BufWriter::new(stream),
        })
    }

    /// Request and decode the current state
    pub fn get_state(&mut self) -> Result<HouseState> {
        self.send_raw(&encode_get_request())?;

        let frame = self.frames.read_frame()?.ok_or_else(|| {
            HouseError::Protocol("house closed the connection before replying".to_string())
        })?;

        decode_state_update(&frame)
    }

    /// Send assignments; true iff the house acknowledged with `OK`
    pub fn set_state(&mut self, assignments: &[Assignment]) -> Result<bool> {
        self.send_raw(&encode_set_request(assignments))?;

        // The ack is unterminated, so read exactly its length
        let mut reply = [0u8; ACK.len()];
        self.frames.get_mut().read_exact(&mut reply)?;
        Ok(reply[..] == *ACK)
    }

    /// Write raw bytes without waiting for a reply
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}
