//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Frames executed through a shared Interpreter

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, ConnectionStats};
