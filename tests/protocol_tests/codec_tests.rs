//! Codec Tests
//!
//! Tests for record and response encoding/decoding and frame accumulation.

use std::io::{self, BufReader, Cursor, Read};

use housing::protocol::{
    decode_record, decode_response, encode_record, encode_response, is_complete_frame,
    read_frame, read_line, write_frame, write_line, Response,
};
use housing::{HousingError, Listing};

// =============================================================================
// Helper Functions
// =============================================================================

fn listing(id: u64, city: &str, address: &str, price: u64, bedrooms: u32) -> Listing {
    Listing {
        id,
        city: city.to_string(),
        address: address.to_string(),
        price,
        bedrooms,
    }
}

/// Yields the input a few bytes at a time, then fails if read past the end
/// of the scripted data.
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    fail_after_end: bool,
}

impl ChunkedReader {
    fn new(data: &str, chunk: usize) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
            pos: 0,
            chunk,
            fail_after_end: false,
        }
    }

    fn strict(data: &str, chunk: usize) -> Self {
        Self {
            fail_after_end: true,
            ..Self::new(data, chunk)
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            if self.fail_after_end {
                return Err(io::Error::new(io::ErrorKind::Other, "read past end of frame"));
            }
            return Ok(0);
        }
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_encode_record_field_order() {
    let encoded = encode_record(&listing(7, "LongBeach", "120 Ocean Blvd", 2400, 2));
    assert_eq!(
        encoded,
        "id=7;city=LongBeach;address=120 Ocean Blvd;price=2400;bedrooms=2"
    );
}

#[test]
fn test_decode_record() {
    let decoded = decode_record("id=7;city=LongBeach;address=120 Ocean Blvd;price=2400;bedrooms=2").unwrap();
    assert_eq!(decoded, listing(7, "LongBeach", "120 Ocean Blvd", 2400, 2));
}

#[test]
fn test_decode_record_missing_field() {
    let result = decode_record("id=7;city=LongBeach;address=x;price=2400");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

#[test]
fn test_decode_record_non_numeric() {
    let result = decode_record("id=seven;city=LongBeach;address=x;price=2400;bedrooms=2");
    assert!(matches!(result, Err(HousingError::Protocol(_))));

    let result = decode_record("id=7;city=LongBeach;address=x;price=cheap;bedrooms=2");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

#[test]
fn test_decode_record_rejects_unknown_field() {
    let result = decode_record("id=7;city=A;address=x;price=1;bedrooms=2;pool=yes");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

#[test]
fn test_decode_record_rejects_bare_token() {
    let result = decode_record("id=7;city=A;address;price=1;bedrooms=2");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_encode_result_response() {
    let response = Response::Results(vec![
        listing(1, "LongBeach", "120 Ocean Blvd", 2400, 2),
        listing(4, "LongBeach", "33 Shoreline Way", 1900, 1),
    ]);

    assert_eq!(
        encode_response(&response),
        "OK RESULT 2\n\
         id=1;city=LongBeach;address=120 Ocean Blvd;price=2400;bedrooms=2\n\
         id=4;city=LongBeach;address=33 Shoreline Way;price=1900;bedrooms=1\n\
         END\n"
    );
}

#[test]
fn test_encode_empty_result() {
    assert_eq!(encode_response(&Response::Results(vec![])), "OK RESULT 0\nEND\n");
}

#[test]
fn test_encode_error_response() {
    assert_eq!(
        encode_response(&Response::invalid_command()),
        "ERROR Invalid command\n"
    );
    assert_eq!(
        encode_response(&Response::backend_unavailable()),
        "ERROR Cannot connect to Data Server\n"
    );
}

#[test]
fn test_encode_decode_preserves_records_and_order() {
    let listings = vec![
        listing(9, "Irvine", "9 Yale Loop", 2800, 4),
        listing(2, "LongBeach", "845 Pine Ave", 3100, 3),
        listing(5, "Anaheim", "502 Katella Ave", 2100, 3),
    ];

    let encoded = encode_response(&Response::Results(listings.clone()));
    match decode_response(&encoded).unwrap() {
        Response::Results(decoded) => assert_eq!(decoded, listings),
        other => panic!("Expected results, got {:?}", other),
    }
}

#[test]
fn test_decode_error_response() {
    assert_eq!(
        decode_response("ERROR Invalid command\n").unwrap(),
        Response::Error("Invalid command".to_string())
    );
}

#[test]
fn test_decode_bye() {
    assert_eq!(decode_response("OK BYE\n").unwrap(), Response::Bye);
}

#[test]
fn test_decode_count_mismatch() {
    let result = decode_response("OK RESULT 2\nid=1;city=A;address=x;price=1;bedrooms=1\nEND\n");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

#[test]
fn test_decode_missing_end() {
    let result = decode_response("OK RESULT 1\nid=1;city=A;address=x;price=1;bedrooms=1\n");
    assert!(matches!(result, Err(HousingError::Protocol(_))));
}

#[test]
fn test_decode_unknown_header() {
    assert!(matches!(decode_response("HELLO\n"), Err(HousingError::Protocol(_))));
    assert!(matches!(decode_response(""), Err(HousingError::Protocol(_))));
    assert!(matches!(decode_response("OK RESULT x\nEND\n"), Err(HousingError::Protocol(_))));
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_is_complete_frame() {
    assert!(is_complete_frame(b"OK RESULT 0\nEND\n"));
    assert!(is_complete_frame(b"ERROR Invalid command\n"));
    assert!(is_complete_frame(b"ERROR"));
    assert!(!is_complete_frame(b"OK RESULT 1\nid=1;city=A"));
    assert!(!is_complete_frame(b"OK RESULT 0\nEND"));
    assert!(!is_complete_frame(b""));
}

#[test]
fn test_read_frame_fragmented() {
    let frame = "OK RESULT 2\n\
                 id=1;city=LongBeach;address=120 Ocean Blvd;price=2400;bedrooms=2\n\
                 id=4;city=LongBeach;address=33 Shoreline Way;price=1900;bedrooms=1\n\
                 END\n";

    for chunk in [1, 3, 7, 64] {
        let mut reader = ChunkedReader::strict(frame, chunk);
        assert_eq!(read_frame(&mut reader).unwrap(), frame, "chunk size {}", chunk);
    }
}

#[test]
fn test_read_frame_stops_at_terminator() {
    // Strict reader errors if read again after END\n, so this only passes
    // when accumulation stops at the terminator rather than at EOF.
    let mut reader = ChunkedReader::strict("OK RESULT 0\nEND\n", 4);
    assert_eq!(read_frame(&mut reader).unwrap(), "OK RESULT 0\nEND\n");
}

#[test]
fn test_read_frame_error_is_terminal() {
    let mut reader = ChunkedReader::strict("ERROR Invalid command\n", 64);
    assert_eq!(read_frame(&mut reader).unwrap(), "ERROR Invalid command\n");
}

#[test]
fn test_read_frame_until_close() {
    let mut reader = ChunkedReader::new("OK BYE\n", 3);
    assert_eq!(read_frame(&mut reader).unwrap(), "OK BYE\n");
}

#[test]
fn test_read_frame_closed_without_data() {
    let mut reader = ChunkedReader::new("", 3);
    let err = read_frame(&mut reader).unwrap_err();
    assert!(err.is_disconnect());
}

#[test]
fn test_write_frame() {
    let mut out = Vec::new();
    write_frame(&mut out, "OK RESULT 0\nEND\n").unwrap();
    assert_eq!(out, b"OK RESULT 0\nEND\n");
}

// =============================================================================
// Line Tests
// =============================================================================

#[test]
fn test_read_lines() {
    let mut reader = BufReader::new(Cursor::new("LIST\r\nSEARCH city=Irvine\nQUIT"));

    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("LIST"));
    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("SEARCH city=Irvine"));
    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("QUIT"));
    assert_eq!(read_line(&mut reader).unwrap(), None);
}

#[test]
fn test_read_line_too_long() {
    let long = "A".repeat(70 * 1024);
    let mut reader = BufReader::new(Cursor::new(long));
    assert!(matches!(read_line(&mut reader), Err(HousingError::Protocol(_))));
}

#[test]
fn test_read_line_recovers_after_too_long_line() {
    let input = format!("{}\nLIST\n", "A".repeat(70 * 1024));
    let mut reader = BufReader::new(Cursor::new(input));

    assert!(matches!(read_line(&mut reader), Err(HousingError::Protocol(_))));
    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("LIST"));
    assert_eq!(read_line(&mut reader).unwrap(), None);
}

#[test]
fn test_read_line_invalid_utf8() {
    let mut reader = BufReader::new(Cursor::new(b"SEARCH city=\xff\xfe\nQUIT\n".to_vec()));

    assert!(matches!(read_line(&mut reader), Err(HousingError::Protocol(_))));
    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("QUIT"));
}

#[test]
fn test_write_line_appends_newline() {
    let mut out = Vec::new();
    write_line(&mut out, "LIST").unwrap();
    write_line(&mut out, "QUIT\n").unwrap();
    assert_eq!(out, b"LIST\nQUIT\n");
}
