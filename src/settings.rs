/// Settings kept in chrome.storage.local
use serde::{Deserialize, Serialize};

/// Storage key holding the path of the history export
pub const HISTORY_PATH_KEY: &str = "history_json";

/// Storage key holding the file read timeout
pub const LOAD_TIMEOUT_KEY: &str = "load_timeout_ms";

/// Storage key holding extra URL patterns that are never looked up
pub const EXTRA_FILTERS_KEY: &str = "extra_filters";

pub const DEFAULT_LOAD_TIMEOUT_MS: u32 = 10_000;

/// Every key read by `Settings`
pub const SETTINGS_KEYS: [&str; 3] = [HISTORY_PATH_KEY, LOAD_TIMEOUT_KEY, EXTRA_FILTERS_KEY];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub history_json: Option<String>,
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u32,
    #[serde(default)]
    pub extra_filters: Vec<String>,
}

fn default_load_timeout_ms() -> u32 {
    DEFAULT_LOAD_TIMEOUT_MS
}

impl Settings {
    /// Configured export path, ignoring blank values
    pub fn history_path(&self) -> Option<&str> {
        self.history_json
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_json: None,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            extra_filters: Vec::new(),
        }
    }
}
