use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::account::TextLimits;

/// Busy timeout applied to every connection, in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default number of rows [`AccountStore::load_all`](crate::store::AccountStore::load_all) accepts.
pub const DEFAULT_LOAD_CAPACITY: usize = 100;

/// Account store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Byte limits enforced on save and on load
    pub limits: TextLimits,
    /// Row capacity used by `load_all`
    pub load_capacity: usize,
    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("accounts.db"),
            limits: TextLimits::default(),
            load_capacity: DEFAULT_LOAD_CAPACITY,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Create a config for the database at `db_path` with default limits
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: TextLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_load_capacity(mut self, capacity: usize) -> Self {
        self.load_capacity = capacity;
        self
    }

    pub fn with_busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
