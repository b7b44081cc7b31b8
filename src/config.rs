//! Configuration for the housing pipeline
//!
//! Centralized configuration with the defaults both servers share.

use std::path::PathBuf;
use std::time::Duration;

/// Default address of the application (caching) server
pub const DEFAULT_APP_ADDR: &str = "127.0.0.1:7100";

/// Default address of the data server
pub const DEFAULT_DATA_ADDR: &str = "127.0.0.1:6000";

/// Default listings file read by the data server
pub const DEFAULT_DATA_FILE: &str = "listings.json";

/// Main configuration shared by both server tiers
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Data Configuration
    // -------------------------------------------------------------------------
    /// JSON file holding the listings (data server only)
    pub data_file: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Data server address the app server forwards cache misses to
    pub backend_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection idle read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Connect/read timeout for one backend round trip (milliseconds, 0 = none)
    pub backend_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            listen_addr: DEFAULT_APP_ADDR.to_string(),
            backend_addr: DEFAULT_DATA_ADDR.to_string(),
            max_connections: 1024,
            read_timeout_ms: 300_000,
            write_timeout_ms: 5000,
            backend_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Backend timeout as a `Duration`, `None` when disabled
    pub fn backend_timeout(&self) -> Option<Duration> {
        millis(self.backend_timeout_ms)
    }

    /// Client read timeout as a `Duration`, `None` when disabled
    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    /// Client write timeout as a `Duration`, `None` when disabled
    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the listings file
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the data server address
    pub fn backend_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.backend_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the backend round trip timeout (in milliseconds)
    pub fn backend_timeout_ms(mut self, ms: u64) -> Self {
        self.config.backend_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
