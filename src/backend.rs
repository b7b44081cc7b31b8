//! Backend Module
//!
//! The app server's view of the data server: one request, one framed reply.

use std::io::{BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{HousingError, Result};
use crate::protocol::{read_frame, write_frame, BackendCommand};

/// Something that can answer backend commands with an encoded response
///
/// `TcpBackend` talks to a real data server. Tests plug in in-process
/// implementations to count or fail round trips.
pub trait Backend: Send + Sync {
    /// Send `command` and return the complete raw response frame
    fn round_trip(&self, command: &BackendCommand) -> Result<String>;
}

/// Backend reached over TCP, one connection per round trip
#[derive(Debug, Clone)]
pub struct TcpBackend {
    addr: String,
    timeout: Option<Duration>,
}

impl TcpBackend {
    /// Create a backend for `addr` with an optional connect/read/write timeout
    pub fn new(addr: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = self
            .addr
            .to_socket_addrs()
            .map_err(|e| unavailable(&self.addr, &e))?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            let attempt = match self.timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => unavailable(&self.addr, &e),
            None => HousingError::BackendUnavailable(format!("{}: no address resolved", self.addr)),
        })
    }
}

impl Backend for TcpBackend {
    fn round_trip(&self, command: &BackendCommand) -> Result<String> {
        let stream = self.connect()?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;

        tracing::debug!("Forwarding to data server {}: {:?}", self.addr, command);

        let mut reader = stream.try_clone()?;
        let mut writer = BufWriter::new(stream);

        write_frame(&mut writer, &command.encode()).map_err(|e| map_io(&self.addr, e))?;
        let frame = read_frame(&mut reader).map_err(|e| map_io(&self.addr, e))?;

        tracing::trace!("Received {} bytes from data server", frame.len());
        Ok(frame)
    }
}

/// Timeouts and dropped connections mid round trip count as unavailable
fn map_io(addr: &str, err: HousingError) -> HousingError {
    match err {
        HousingError::Io(e)
            if matches!(
                e.kind(),
                ErrorKind::WouldBlock
                    | ErrorKind::TimedOut
                    | ErrorKind::UnexpectedEof
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
            ) =>
        {
            unavailable(addr, &e)
        }
        other => other,
    }
}

fn unavailable(addr: &str, err: &std::io::Error) -> HousingError {
    HousingError::BackendUnavailable(format!("{}: {}", addr, err))
}
