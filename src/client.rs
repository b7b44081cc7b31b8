//! Client
//!
//! Blocking client for the app server (also usable against a data server).

use std::io::BufWriter;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{decode_response, read_frame, write_line, Response};

/// A single session with a server
pub struct Client {
    reader: TcpStream,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr` with an optional read/write timeout
    pub fn connect(addr: &str, timeout: Option<Duration>) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;

        let reader = stream.try_clone()?;
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command line and return the raw response frame
    pub fn send_raw(&mut self, line: &str) -> Result<String> {
        write_line(&mut self.writer, line)?;
        read_frame(&mut self.reader)
    }

    /// Send one command line and decode the response
    pub fn send(&mut self, line: &str) -> Result<Response> {
        let frame = self.send_raw(line)?;
        decode_response(&frame)
    }

    /// `LIST`
    pub fn list(&mut self) -> Result<Response> {
        self.send("LIST")
    }

    /// `SEARCH` with optional city and max price
    pub fn search(&mut self, city: Option<&str>, max_price: Option<u64>) -> Result<Response> {
        let mut line = String::from("SEARCH");
        if let Some(city) = city {
            line.push_str(&format!(" city={}", city));
        }
        if let Some(max_price) = max_price {
            line.push_str(&format!(" max_price={}", max_price));
        }
        self.send(&line)
    }

    /// `QUIT`, consuming the session
    pub fn quit(mut self) -> Result<()> {
        self.send_raw("QUIT")?;
        Ok(())
    }
}
