use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing column: {0}")]
    Schema(String),

    #[error("Network error: {0}")]
    Http(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Run failed with status: {0}")]
    RunFailed(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Api { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<attohttpc::Error> for Error {
    fn from(err: attohttpc::Error) -> Self {
        Error::Http(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Auth(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
