//! Request Router
//!
//! App server orchestration: cache lookup, backend forwarding, ranking.
//!
//! ## Request Flow
//! ```text
//! client line ──► parse ──► QUIT ──────────────────────────► OK BYE (close)
//!                   │
//!                   ├─► invalid ───────────────────────────► ERROR Invalid command
//!                   │
//!                   └─► LIST / SEARCH ──► cache hit ───────► cached response
//!                                          │
//!                                          └─► miss ──► RAW_* round trip
//!                                                         ──► rank ──► store ──► response
//! ```

use std::sync::Arc;

use crate::backend::Backend;
use crate::cache::{CacheOutcome, QueryCache};
use crate::error::{HousingError, Result};
use crate::network::{Handler, Reply};
use crate::protocol::{
    decode_response, encode_response, BackendCommand, ClientCommand, Response,
    BACKEND_INVALID_RESPONSE,
};
use crate::ranking::rank;

/// Routes client commands through the query cache to a backend
///
/// Owns its cache, so independent routers never share entries.
pub struct Router {
    /// Ranked responses keyed by exact (trimmed) command text
    cache: QueryCache,

    /// Data server used on cache misses
    backend: Arc<dyn Backend>,
}

impl Router {
    /// Create a router with an empty cache
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            cache: QueryCache::new(),
            backend,
        }
    }

    /// Handle one client command line
    pub fn route(&self, line: &str) -> Reply {
        let key = line.trim();

        let command = match ClientCommand::parse(key) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!("Invalid command {:?}: {}", key, e);
                return Reply::respond(encode_response(&Response::invalid_command()));
            }
        };

        let backend_command = match command.backend_command() {
            Some(backend_command) => backend_command,
            None => return Reply::close(encode_response(&Response::Bye)),
        };

        let result = self
            .cache
            .get_or_compute(key, || self.fetch_ranked(&backend_command));

        match result {
            Ok((response, CacheOutcome::Hit)) => {
                tracing::debug!("Cache hit for {:?}", key);
                Reply::respond(response)
            }
            Ok((response, CacheOutcome::Miss)) => {
                tracing::debug!("Cache miss for {:?}, cached ranked result", key);
                Reply::respond(response)
            }
            Err(HousingError::Backend(frame)) => {
                tracing::debug!("Data server rejected {:?}: {}", key, frame.trim_end());
                Reply::respond(frame)
            }
            Err(HousingError::Protocol(detail)) => {
                tracing::warn!("Invalid response from data server for {:?}: {}", key, detail);
                Reply::respond(encode_response(&Response::error(BACKEND_INVALID_RESPONSE)))
            }
            Err(e) => {
                tracing::warn!("Cannot reach data server for {:?}: {}", key, e);
                Reply::respond(encode_response(&Response::backend_unavailable()))
            }
        }
    }

    /// One backend round trip, decoded and ranked, re-encoded for caching
    ///
    /// A backend `ERROR` frame comes back as `HousingError::Backend` holding
    /// the frame verbatim so it is passed through but never cached.
    fn fetch_ranked(&self, command: &BackendCommand) -> Result<String> {
        let frame = self.backend.round_trip(command)?;

        match decode_response(&frame)? {
            Response::Results(listings) => {
                Ok(encode_response(&Response::Results(rank(listings))))
            }
            Response::Error(_) => {
                let mut frame = frame;
                if !frame.ends_with('\n') {
                    frame.push('\n');
                }
                Err(HousingError::Backend(frame))
            }
            Response::Bye => Err(HousingError::Protocol(
                "unexpected OK BYE from data server".to_string(),
            )),
        }
    }

    /// The router's query cache
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

impl Handler for Router {
    fn handle(&self, line: &str) -> Reply {
        self.route(line)
    }
}
