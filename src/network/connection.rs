//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{HousingError, Result};
use crate::protocol::{encode_response, read_line, write_frame, Response};
use super::Handler;

/// Handles a single client connection
pub struct Connection<H: Handler> {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Request handler shared by all connections
    handler: Arc<H>,

    /// Peer address for logging
    peer_addr: String,
}

impl<H: Handler> Connection<H> {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on cloned read/write handles
    pub fn new(stream: TcpStream, handler: Arc<H>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            handler,
            peer_addr,
        })
    }

    /// Configure connection timeouts (`None` disables)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(read)?;
        self.writer.get_ref().set_write_timeout(write)?;
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads request lines in a loop and writes one response per line.
    /// Returns when the client disconnects, idles past the read timeout,
    /// or the handler asks to close.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let line = match read_line(&mut self.reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if e.is_disconnect() => {
                    tracing::debug!("Connection with {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(ref e) if e.is_timeout() => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(HousingError::Protocol(detail)) => {
                    // Malformed line: answer it and keep the session open
                    tracing::debug!("Malformed request from {}: {}", self.peer_addr, detail);
                    self.send(&encode_response(&Response::invalid_command()))?;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::debug!("Request from {}: {}", self.peer_addr, line);

            let reply = self.handler.handle(&line);

            tracing::trace!(
                "Response to {}: {}",
                self.peer_addr,
                reply.response.lines().next().unwrap_or("")
            );

            if let Err(e) = self.send(&reply.response) {
                // Client went away before the response could be written
                if e.is_disconnect() {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if reply.close {
                tracing::debug!("Client {} ended the session", self.peer_addr);
                return Ok(());
            }
        }
    }

    fn send(&mut self, frame: &str) -> Result<()> {
        write_frame(&mut self.writer, frame)
    }
}
