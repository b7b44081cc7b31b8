//! Command definitions
//!
//! Client-facing and backend-facing request verbs, and their parsing.

use crate::error::{HousingError, Result};
use crate::listing::Filter;

pub const LIST: &str = "LIST";
pub const SEARCH: &str = "SEARCH";
pub const QUIT: &str = "QUIT";
pub const RAW_LIST: &str = "RAW_LIST";
pub const RAW_SEARCH: &str = "RAW_SEARCH";

/// Filter keys accepted in `SEARCH` / `RAW_SEARCH`
pub const CITY_KEY: &str = "city";
pub const MAX_PRICE_KEY: &str = "max_price";

/// A command sent by a client to the app server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// All listings
    List,

    /// Listings matching the filter
    Search(Filter),

    /// End the session
    Quit,
}

impl ClientCommand {
    /// Parse one request line
    ///
    /// Verbs are case-sensitive. Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or_else(|| invalid("empty request"))?;

        match verb {
            LIST => {
                expect_no_args(verb, tokens)?;
                Ok(ClientCommand::List)
            }
            QUIT => {
                expect_no_args(verb, tokens)?;
                Ok(ClientCommand::Quit)
            }
            SEARCH => Ok(ClientCommand::Search(parse_filter(tokens)?)),
            other => Err(invalid(&format!("unknown verb {:?}", other))),
        }
    }

    /// Translate to the data server verb (`LIST`→`RAW_LIST`, `SEARCH`→`RAW_SEARCH`)
    ///
    /// `QUIT` is handled locally and has no backend form.
    pub fn backend_command(&self) -> Option<BackendCommand> {
        match self {
            ClientCommand::List => Some(BackendCommand::RawList),
            ClientCommand::Search(filter) => Some(BackendCommand::RawSearch(filter.clone())),
            ClientCommand::Quit => None,
        }
    }
}

/// A command sent by the app server to the data server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    RawList,
    RawSearch(Filter),
}

impl BackendCommand {
    /// Parse one request line received by the data server
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or_else(|| invalid("empty request"))?;

        match verb {
            RAW_LIST => {
                expect_no_args(verb, tokens)?;
                Ok(BackendCommand::RawList)
            }
            RAW_SEARCH => Ok(BackendCommand::RawSearch(parse_filter(tokens)?)),
            other => Err(invalid(&format!("unknown verb {:?}", other))),
        }
    }

    /// Encode as a newline-terminated request line
    pub fn encode(&self) -> String {
        match self {
            BackendCommand::RawList => format!("{}\n", RAW_LIST),
            BackendCommand::RawSearch(filter) => {
                let mut line = String::from(RAW_SEARCH);
                if let Some(city) = &filter.city {
                    line.push_str(&format!(" {}={}", CITY_KEY, city));
                }
                if let Some(max_price) = filter.max_price {
                    line.push_str(&format!(" {}={}", MAX_PRICE_KEY, max_price));
                }
                line.push('\n');
                line
            }
        }
    }

    /// The filter this command applies
    pub fn filter(&self) -> Filter {
        match self {
            BackendCommand::RawList => Filter::any(),
            BackendCommand::RawSearch(filter) => filter.clone(),
        }
    }
}

/// Parse `key=value` filter tokens. A repeated key keeps its last value.
fn parse_filter<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Filter> {
    let mut filter = Filter::default();

    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| invalid(&format!("token {:?} is not key=value", token)))?;

        if value.is_empty() {
            return Err(invalid(&format!("empty value for {:?}", key)));
        }

        match key {
            CITY_KEY => filter.city = Some(value.to_string()),
            MAX_PRICE_KEY => {
                let max_price = value
                    .parse::<u64>()
                    .map_err(|_| invalid(&format!("max_price {:?} is not a number", value)))?;
                filter.max_price = Some(max_price);
            }
            other => return Err(invalid(&format!("unknown filter key {:?}", other))),
        }
    }

    Ok(filter)
}

fn expect_no_args<'a>(verb: &str, mut tokens: impl Iterator<Item = &'a str>) -> Result<()> {
    match tokens.next() {
        Some(extra) => Err(invalid(&format!("{} takes no arguments, got {:?}", verb, extra))),
        None => Ok(()),
    }
}

fn invalid(detail: &str) -> HousingError {
    HousingError::Protocol(detail.to_string())
}
