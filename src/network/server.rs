//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{HousingError, Result};
use crate::protocol::{encode_response, write_frame, Response, SERVER_BUSY};
use super::{Connection, Handler};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Open sessions by id; the stream clones let shutdown unblock their reads
type Sessions = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server serving request lines through a `Handler`
///
/// ## Concurrency:
/// - One thread per connection, at most `max_connections` at once
/// - `handler` is shared via `Arc` and synchronizes its own state
/// - `shutdown` is polled by the non-blocking accept loop
pub struct Server<H: Handler> {
    config: Config,
    handler: Arc<H>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    sessions: Sessions,
    next_session_id: u64,
}

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shut down gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl<H: Handler> Server<H> {
    /// Create a new server with the given config and handler
    pub fn new(config: Config, handler: Arc<H>) -> Self {
        Self {
            config,
            handler,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_session_id: 0,
        }
    }

    /// Bind the listening socket and return the bound address
    ///
    /// Called by `run` if needed; call it first to learn an ephemeral port.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            HousingError::Config(format!("cannot listen on {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let addr = self.bind()?;
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(HousingError::Config("listener not bound".to_string())),
        };

        tracing::info!("Listening on {}", addr);

        let wait_group = WaitGroup::new();

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.dispatch(stream, peer, &wait_group) {
                        tracing::warn!("Failed to start session for {}: {}", peer, e);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        // Release the port before draining sessions
        drop(listener);

        let open = {
            let sessions = self.sessions.lock();
            for stream in sessions.values() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            sessions.len()
        };
        tracing::info!("Shutting down, waiting for {} open session(s)", open);
        wait_group.wait();

        Ok(())
    }

    /// Hand an accepted stream to a new session thread
    fn dispatch(&mut self, stream: TcpStream, peer: SocketAddr, wait_group: &WaitGroup) -> Result<()> {
        // Accepted sockets may inherit non-blocking mode from the listener
        stream.set_nonblocking(false)?;

        let id = self.next_session_id;
        let admitted = {
            let mut sessions = self.sessions.lock();
            let open = sessions.len();
            if open < self.config.max_connections {
                sessions.insert(id, stream.try_clone()?);
                Ok(())
            } else {
                Err(open)
            }
        };

        if let Err(open) = admitted {
            tracing::warn!(
                "Rejecting {}: {} connections open (max {})",
                peer,
                open,
                self.config.max_connections
            );
            let mut stream = stream;
            let _ = write_frame(&mut stream, &encode_response(&Response::error(SERVER_BUSY)));
            return Ok(());
        }
        self.next_session_id += 1;

        tracing::debug!("Connected by {} (session {})", peer, id);

        let handler = Arc::clone(&self.handler);
        let sessions = Arc::clone(&self.sessions);
        let wait_group = wait_group.clone();
        let read_timeout = self.config.read_timeout();
        let write_timeout = self.config.write_timeout();

        let spawned = thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let result = Connection::new(stream, handler).and_then(|mut connection| {
                    connection.set_timeouts(read_timeout, write_timeout)?;
                    connection.handle()
                });
                if let Err(e) = result {
                    tracing::warn!("Session {} with {} ended with error: {}", id, peer, e);
                }
                sessions.lock().remove(&id);
                tracing::debug!("Connection with {} closed", peer);
                drop(wait_group);
            });

        if let Err(e) = spawned {
            self.sessions.lock().remove(&id);
            return Err(HousingError::Io(e));
        }

        Ok(())
    }

    /// Get a handle that can stop this server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
