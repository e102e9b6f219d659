//! Store and source configuration.
//!
//! Everything here is plain data with serde support, so a deployment can
//! keep it in a JSON file:
//!
//! ```
//! use profile_store::{StalePolicy, StoreConfig};
//!
//! let config = StoreConfig::from_json_str(
//!     r#"{ "debounce_ms": 150, "stale_policy": "last_resolved_wins" }"#,
//! ).unwrap();
//! assert_eq!(config.debounce_ms, 150);
//! assert_eq!(config.stale_policy, StalePolicy::LastResolvedWins);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quiescence window for `set_query`, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

pub const DEFAULT_USERS_PATH: &str = "users";

/// How the store treats responses from overlapping `load()` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Only the most recently issued load may publish; older responses
    /// are dropped when they resolve.
    #[default]
    DiscardStale,
    /// Whichever response resolves last overwrites the state, even if it
    /// belongs to an older request.
    LastResolvedWins,
}

/// Where and how the HTTP source fetches profile records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub users_path: String,
    /// Per-request timeout enforced by the HTTP client. `None` = no limit.
    pub request_timeout_ms: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            users_path: DEFAULT_USERS_PATH.to_string(),
            request_timeout_ms: None,
        }
    }
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the profile listing endpoint.
    pub fn users_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.users_path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Tuning knobs for [`ProfileStore`](crate::ProfileStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub debounce_ms: u64,
    pub stale_policy: StalePolicy,
    /// Upper bound for a single fetch. `None` lets a hung source keep the
    /// store in `Loading` indefinitely.
    pub fetch_timeout_ms: Option<u64>,
    pub source: SourceConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            stale_policy: StalePolicy::default(),
            fetch_timeout_ms: None,
            source: SourceConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file. Missing fields fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = millis(window);
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
