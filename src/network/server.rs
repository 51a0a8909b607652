//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{HouseError, Result};
use crate::house::House;
use crate::interpreter::Interpreter;
use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Clonable handle that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop; `run` returns once workers have exited
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Sockets currently being served, so shutdown can unblock their readers
type ActiveStreams = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for the house
pub struct Server {
    config: Config,
    listener: TcpListener,
    interpreter: Interpreter,
    shutdown: ShutdownHandle,
    active: ActiveStreams,
}

impl Server {
    /// Validate the config and bind the listening socket
    pub fn bind(config: Config, house: Arc<House>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            interpreter: Interpreter::new(house),
            shutdown: ShutdownHandle::default(),
            active: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run the accept loop (blocking until shutdown)
    ///
    /// Accepted sockets are queued to `max_connections` workers. When every
    /// worker is busy and the queue is full, new connections are dropped.
    pub fn run(&self) -> Result<()> {
        let worker_count = self.config.max_connections;
        let (tx, rx) = channel::bounded::<TcpStream>(worker_count);

        let (workers, spawn_error) =
            start_workers(worker_count, |id| self.spawn_worker(id, rx.clone()));
        drop(rx);

        let result = match spawn_error {
            Some(e) => Err(e),
            None => {
                tracing::info!("Serving with {} worker(s)", worker_count);
                self.accept_loop(&tx)
            }
        };

        // Stop workers: no new streams, then unblock the ones mid-read
        self.shutdown.shutdown();
        drop(tx);
        for (_, stream) in self.active.lock().drain() {
            let _ = stream.shutdown(Shutdown::Both);
        }

        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        result
    }

    fn accept_loop(&self, tx: &channel::Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::info!("{} connected", addr);

                    // Some platforms hand out sockets that inherit non-blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping {}: {}", addr, e);
                        continue;
                    }

                    match tx.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("All workers busy, dropping connection from {}", addr);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(HouseError::Network("worker pool has stopped".to_string()));
                        }
                    }
                }
                Err(e) => {
                    if e.kind() != ErrorKind::WouldBlock && e.kind() != ErrorKind::Interrupted {
                        tracing::warn!("Accept error: {}", e);
                    }
                    if let Some(delay) = accept_backoff(e.kind()) {
                        thread::sleep(delay);
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let interpreter = self.interpreter.clone();
        let config = self.config.clone();
        let shutdown = self.shutdown.clone();
        let active = Arc::clone(&self.active);

        let handle = thread::Builder::new()
            .name(format!("iothouse-worker-{}", id))
            .spawn(move || {
                let mut served: u64 = 0;
                for stream in rx.iter() {
                    served += 1;
                    let key = ((id as u64) << 32) | served;

                    match stream.try_clone() {
                        Ok(clone) => {
                            active.lock().insert(key, clone);
                        }
                        Err(e) => {
                            tracing::warn!("Dropping connection: {}", e);
                            continue;
                        }
                    }

                    // Registered before this check, so a concurrent shutdown
                    // either sees the stream or we see the flag
                    if !shutdown.is_shutdown() {
                        serve(stream, interpreter.clone(), &config);
                    }

                    active.lock().remove(&key);
                }
                tracing::debug!("Worker {} exiting", id);
            })?;

        Ok(handle)
    }
}

/// Delay before the next accept after a failed one
///
/// Persistent failures (e.g. out of file descriptors) back off like an idle
/// poll instead of spinning; only an interrupted call retries at once.
fn accept_backoff(kind: ErrorKind) -> Option<Duration> {
    match kind {
        ErrorKind::Interrupted => None,
        _ => Some(ACCEPT_POLL_INTERVAL),
    }
}

/// Spawn up to `count` workers, stopping at the first failure
///
/// Workers that did start are always returned so the caller can join them.
fn start_workers<F>(count: usize, mut spawn: F) -> (Vec<JoinHandle<()>>, Option<HouseError>)
where
    F: FnMut(usize) -> Result<JoinHandle<()>>,
{
    let mut workers = Vec::with_capacity(count);
    for id in 0..count {
        match spawn(id) {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                tracing::error!("Failed to spawn worker {}: {}", id, e);
                return (workers, Some(e));
            }
        }
    }
    (workers, None)
}

fn serve(stream: TcpStream, interpreter: Interpreter, config: &Config) {
    let mut connection = match Connection::from_tcp(stream, interpreter, config) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    match connection.handle() {
        Ok(stats) => tracing::info!(
            "{} closed after {} frame(s), {} unknown",
            connection.peer_addr(),
            stats.frames,
            stats.unknown
        ),
        Err(e) => tracing::warn!("{} closed: {}", connection.peer_addr(), e),
    }
}
