use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a trigger runs without a team selected.
pub const SELECT_TEAM_FIRST: &str = "Please select the team first.";

#[derive(Error, Debug)]
pub enum LinearError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL errors: {}", messages.join(", "))]
    GraphQL { messages: Vec<String> },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    /// User-configuration error. Never retried automatically.
    #[error("{0}")]
    Halted(String),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No API key found. Set LINEAR_API_KEY env var or add api_key to ~/.config/linear-triggers/config.toml"
    )]
    MissingApiKey,

    #[error("Team not specified and no default_team in config")]
    NoTeam,

    #[error("Unknown trigger: {0}")]
    UnknownTrigger(String),

    #[error("Failed to access cursor store at {path}: {source}")]
    CursorStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LinearError {
    pub fn missing_team() -> Self {
        LinearError::Halted(SELECT_TEAM_FIRST.to_string())
    }

    /// True for user-configuration errors that halt the trigger.
    pub fn is_halted(&self) -> bool {
        matches!(self, LinearError::Halted(_))
    }

    /// Whether the host may retry the invocation on its own schedule.
    /// A reply missing its expected nesting is never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinearError::Http(_) => true,
            LinearError::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinearError>;
