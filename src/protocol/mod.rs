//! Protocol Module
//!
//! Defines the text protocol shared by client ↔ app server and
//! app server ↔ data server.
//!
//! ### Client Verbs
//! - `LIST`
//! - `SEARCH city=<string> max_price=<integer>` (either token optional, any order)
//! - `QUIT`
//!
//! ### Backend Verbs
//! - `RAW_LIST`
//! - `RAW_SEARCH city=<string> max_price=<integer>`
//!
//! ### Responses
//! - `OK RESULT <n>` + `n` records + `END`
//! - `ERROR <message>`
//! - `OK BYE` (reply to `QUIT`)

mod command;
mod response;
mod codec;

pub use command::{BackendCommand, ClientCommand};
pub use response::{
    Response, BACKEND_INVALID_RESPONSE, BACKEND_UNAVAILABLE, INVALID_COMMAND, SERVER_BUSY,
};
pub use codec::{
    decode_record, decode_response, encode_record, encode_response, is_complete_frame,
    read_frame, read_line, write_frame, write_line, MAX_FRAME_SIZE, MAX_LINE_SIZE,
};
