/// Error types for loading the history export and handling extension events
use thiserror::Error;

/// Why the visit map could not be (re)loaded
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("history file location is not configured")]
    NotConfigured,

    #[error("history file path {0:?} is not a valid file location")]
    InvalidPath(String),

    #[error("failed to read settings: {0}")]
    Storage(String),

    #[error("failed to read history file: {0}")]
    Read(String),

    #[error("timed out reading history file after {0} ms")]
    Timeout(u32),

    #[error("history file is not valid JSON: {0}")]
    Parse(String),

    #[error("history file contains no visits")]
    Empty,
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

/// Errors surfaced by the background event handlers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("browser call failed: {0}")]
    Bridge(String),
}

pub type Result<T> = std::result::Result<T, Error>;
