//! Frame reader
//!
//! Splits a byte stream into `.`-terminated frames.

use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{HouseError, Result};

/// Frame terminator byte
pub const TERMINATOR: u8 = b'.';

/// Reads one frame at a time from a byte stream
///
/// Bytes are pulled one at a time so nothing past the terminator is consumed;
/// wrap sockets in a `BufReader` to avoid a syscall per byte.
pub struct FrameReader<R> {
    reader: R,
    max_frame_size: usize,
    buffer: BytesMut,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader that rejects frames longer than `max_frame_size` bytes
    pub fn new(reader: R, max_frame_size: usize) -> Self {
        Self {
            reader,
            max_frame_size,
            buffer: BytesMut::with_capacity(64),
        }
    }

    /// Read the next frame, terminator excluded
    ///
    /// Returns `Ok(None)` once the stream has ended and nothing is buffered.
    /// End of stream after some bytes closes the frame implicitly.
    pub fn read_frame(&mut self) -> Result<Option<Bytes>> {
        self.buffer.clear();

        loop {
            let byte = match self.read_byte()? {
                Some(byte) => byte,
                None if self.buffer.is_empty() => return Ok(None),
                None => {
                    tracing::trace!("Stream ended mid-frame, closing frame implicitly");
                    return Ok(Some(self.buffer.split().freeze()));
                }
            };

            tracing::trace!("Byte received: {:?}", byte as char);

            if byte == TERMINATOR {
                return Ok(Some(self.buffer.split().freeze()));
            }

            if self.buffer.len() >= self.max_frame_size {
                return Err(HouseError::FrameTooLarge {
                    limit: self.max_frame_size,
                });
            }
            self.buffer.put_u8(byte);
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Get the frame size bound
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Borrow the underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Mutably borrow the underlying reader
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}
