//! Error types for clip-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for clip-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for clip operations
#[derive(Error, Debug)]
pub enum Error {
    /// No API token was supplied
    #[error("Missing API token: set CLIP_TOKEN or pass --token")]
    MissingCredential,

    /// First positional token is not a known collection
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Subcommand is not valid for the collection
    #[error("Unknown subcommand '{subcommand}' for '{collection}'. Valid subcommands: {}", valid.join(", "))]
    UnknownSubcommand {
        collection: String,
        subcommand: String,
        valid: Vec<&'static str>,
    },

    /// A required identifier or option is missing
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// An option value could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A looked-up entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server answered with status >= 400
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// A 2xx body did not have the shape a command needed
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Build a remote error from a status code and response body.
    ///
    /// Uses the `error` field of a JSON body when there is one, otherwise
    /// falls back to `HTTP <status>: <body>`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("error") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) if !other.is_null() => Some(other.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("HTTP {status}: {body}"));

        Error::Remote { status, message }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownCommand(_)
            | Error::UnknownSubcommand { .. }
            | Error::MissingArgument(_)
            | Error::InvalidArgument(_)
            | Error::Config(_)
            | Error::InvalidUrl(_) => 2, // UsageError
            Error::Transport(_) => 3,    // NetworkError
            Error::MissingCredential => 4, // AuthError
            Error::Remote { status, .. } => match *status {
                401 | 403 => 4, // AuthError
                404 => 5,       // NotFound
                _ => 6,         // RemoteError
            },
            Error::FileNotFound(_) | Error::NotFound(_) => 5, // NotFound
            Error::MalformedResponse(_) => 7,
            _ => 1, // GeneralError
        }
    }
}
