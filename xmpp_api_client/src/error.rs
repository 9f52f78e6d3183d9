use thiserror::Error;

/// Code reported when a failed command response cannot be parsed.
pub const GENERIC_ERROR_CODE: i64 = 99;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid jid: {0}")]
    InvalidJid(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid url scheme: {0}")]
    InvalidUrlScheme(String),
    #[error("unknown statistic: {0}")]
    UnknownStatistic(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid command name: {0}")]
    InvalidCommandName(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("oauth endpoint not found (404)")]
    EndpointNotFound,
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("server did not return an access token")]
    MissingAccessToken,
    #[error("error retrieving token: {description}")]
    OAuth { error: String, description: String },
    #[error("Error {code}: {message}")]
    Remote {
        status: u16,
        code: i64,
        message: String,
    },
}

impl ApiError {
    /// True when the error was detected locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidJid(_)
                | ApiError::InvalidUrl(_)
                | ApiError::InvalidUrlScheme(_)
                | ApiError::UnknownStatistic(_)
                | ApiError::MissingField(_)
                | ApiError::InvalidCommandName(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
