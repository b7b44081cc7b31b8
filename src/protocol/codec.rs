//! Protocol codec
//!
//! Encoding and decoding functions for the line-oriented text protocol.
//!
//! ## Wire Format
//!
//! ### Result Response
//! ```text
//! OK RESULT <count>\n
//! id=..;city=..;address=..;price=..;bedrooms=..\n   (count times)
//! END\n
//! ```
//!
//! ### Error Response
//! ```text
//! ERROR <message>\n
//! ```
//!
//! ### Framing
//! Responses are not length-prefixed. A receiver accumulates bytes until the
//! buffer ends with `END\n` or begins with `ERROR`, or the peer closes.
//! `END\n` never occurs inside a well-formed record, so the test is sound for
//! values that respect the no-escaping contract.

use std::io::{BufRead, Read, Write};

use bytes::BytesMut;

use crate::error::{HousingError, Result};
use crate::listing::Listing;
use super::Response;

/// Size of each socket read while accumulating a frame
pub const READ_CHUNK_SIZE: usize = 4096;

/// Maximum response frame size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Maximum request line length (64 KB)
pub const MAX_LINE_SIZE: u64 = 64 * 1024;

const RESULT_HEADER: &str = "OK RESULT";
const BYE: &str = "OK BYE";
const END: &str = "END";
const ERROR: &str = "ERROR";

// =============================================================================
// Record Encoding/Decoding
// =============================================================================

/// Encode a listing as `id=..;city=..;address=..;price=..;bedrooms=..`
pub fn encode_record(listing: &Listing) -> String {
    format!(
        "id={};city={};address={};price={};bedrooms={}",
        listing.id, listing.city, listing.address, listing.price, listing.bedrooms
    )
}

/// Decode one record line
///
/// All five fields must be present. Unknown keys are rejected.
pub fn decode_record(line: &str) -> Result<Listing> {
    let mut id = None;
    let mut city = None;
    let mut address = None;
    let mut price = None;
    let mut bedrooms = None;

    for part in line.split(';') {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            HousingError::Protocol(format!("record field {:?} is not key=value", part))
        })?;

        match key {
            "id" => id = Some(parse_number(key, value)?),
            "city" => city = Some(value.to_string()),
            "address" => address = Some(value.to_string()),
            "price" => price = Some(parse_number(key, value)?),
            "bedrooms" => bedrooms = Some(parse_number::<u32>(key, value)?),
            other => {
                return Err(HousingError::Protocol(format!(
                    "unknown record field {:?}",
                    other
                )))
            }
        }
    }

    Ok(Listing {
        id: id.ok_or_else(|| missing_field("id"))?,
        city: city.ok_or_else(|| missing_field("city"))?,
        address: address.ok_or_else(|| missing_field("address"))?,
        price: price.ok_or_else(|| missing_field("price"))?,
        bedrooms: bedrooms.ok_or_else(|| missing_field("bedrooms"))?,
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        HousingError::Protocol(format!("record field {} has non-numeric value {:?}", key, value))
    })
}

fn missing_field(name: &str) -> HousingError {
    HousingError::Protocol(format!("record is missing field {}", name))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to its wire text
pub fn encode_response(response: &Response) -> String {
    match response {
        Response::Results(listings) => {
            let mut out = format!("{} {}\n", RESULT_HEADER, listings.len());
            for listing in listings {
                out.push_str(&encode_record(listing));
                out.push('\n');
            }
            out.push_str(END);
            out.push('\n');
            out
        }
        Response::Error(message) => format!("{} {}\n", ERROR, message),
        Response::Bye => format!("{}\n", BYE),
    }
}

/// Decode a complete response frame
///
/// For result frames the header count must equal the number of records and
/// the `END` line must be present.
pub fn decode_response(text: &str) -> Result<Response> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| HousingError::Protocol("empty response".to_string()))?;

    if header == ERROR {
        return Ok(Response::Error(String::new()));
    }
    if let Some(message) = header.strip_prefix("ERROR ") {
        return Ok(Response::Error(message.to_string()));
    }
    if header == BYE {
        return Ok(Response::Bye);
    }

    let count = header
        .strip_prefix(RESULT_HEADER)
        .map(str::trim)
        .ok_or_else(|| HousingError::Protocol(format!("unexpected response header {:?}", header)))?
        .parse::<usize>()
        .map_err(|_| HousingError::Protocol(format!("invalid result count in {:?}", header)))?;

    let mut listings = Vec::with_capacity(count.min(1024));
    let mut ended = false;
    for line in lines {
        if line == END {
            ended = true;
            break;
        }
        listings.push(decode_record(line)?);
    }

    if !ended {
        return Err(HousingError::Protocol("response is missing END".to_string()));
    }
    if listings.len() != count {
        return Err(HousingError::Protocol(format!(
            "result count mismatch: header says {}, got {}",
            count,
            listings.len()
        )));
    }

    Ok(Response::Results(listings))
}

// =============================================================================
// Framing
// =============================================================================

/// True once `buf` holds a complete response
///
/// Complete when the text ends with `END\n` or begins with `ERROR`.
pub fn is_complete_frame(buf: &[u8]) -> bool {
    buf.ends_with(b"END\n") || buf.starts_with(ERROR.as_bytes())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete response frame from a stream
///
/// Accumulates reads until `is_complete_frame` holds or the peer closes.
/// A close before any byte arrives is an `UnexpectedEof` I/O error.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<String> {
    let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            if buf.is_empty() {
                return Err(HousingError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed before a response arrived",
                )));
            }
            break;
        }

        buf.extend_from_slice(&chunk[..n]);

        if buf.len() > MAX_FRAME_SIZE {
            return Err(HousingError::Protocol(format!(
                "Response frame too large: {} bytes (max {})",
                buf.len(),
                MAX_FRAME_SIZE
            )));
        }

        if is_complete_frame(&buf) {
            break;
        }
    }

    String::from_utf8(buf.to_vec())
        .map_err(|_| HousingError::Protocol("response is not valid UTF-8".to_string()))
}

/// Write an encoded frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &str) -> Result<()> {
    writer.write_all(frame.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one request line
///
/// Returns `None` when the peer has closed. A final line without a trailing
/// newline is still returned. The newline itself is stripped.
///
/// An over-long line is discarded through its newline and a line that is
/// not UTF-8 is consumed whole; both come back as `Protocol` errors, leaving
/// the reader positioned at the next request.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = reader.by_ref().take(MAX_LINE_SIZE).read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }
    if !buf.ends_with(b"\n") && n as u64 == MAX_LINE_SIZE {
        skip_line(reader)?;
        return Err(HousingError::Protocol(format!(
            "Request line too long (max {} bytes)",
            MAX_LINE_SIZE
        )));
    }

    while buf.ends_with(b"\n") || buf.ends_with(b"\r") {
        buf.pop();
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| HousingError::Protocol("request line is not valid UTF-8".to_string()))
}

/// Consume bytes up to and including the next newline (or EOF)
fn skip_line<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Write a request line, appending the newline if missing
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
