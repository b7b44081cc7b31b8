//! Data Service
//!
//! Request handling for the data tier: parse a backend verb, filter the
//! listing store, encode the (unranked) result.

use std::sync::Arc;

use crate::listing::{filter, ListingStore};
use crate::network::{Handler, Reply};
use crate::protocol::{encode_response, BackendCommand, Response};

/// Answers `RAW_LIST` / `RAW_SEARCH` against a shared listing store
#[derive(Debug, Clone)]
pub struct DataService {
    store: Arc<ListingStore>,
}

impl DataService {
    /// Create a service over `store`
    pub fn new(store: Arc<ListingStore>) -> Self {
        Self { store }
    }

    /// Execute one request line and return the encoded response
    ///
    /// Malformed requests produce `ERROR Invalid command`.
    pub fn execute(&self, line: &str) -> String {
        let response = match BackendCommand::parse(line.trim()) {
            Ok(command) => Response::Results(filter(self.store.all(), &command.filter())),
            Err(e) => {
                tracing::debug!("Rejected data request {:?}: {}", line, e);
                Response::invalid_command()
            }
        };
        encode_response(&response)
    }
}

impl Handler for DataService {
    fn handle(&self, line: &str) -> Reply {
        Reply::respond(self.execute(line))
    }
}
