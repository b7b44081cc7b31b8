//! Protocol Tests
//!
//! Codec (records, responses, framing) and request parsing.

mod codec_tests;
