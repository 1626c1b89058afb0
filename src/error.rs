use thiserror::Error;

/// Errors surfaced by the client library.
///
/// Nothing here is fatal: callers log and keep their last-known-good state.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {detail}")]
    Status { status: u16, detail: String },

    /// An authorized call was refused; the stored credential is no longer valid.
    #[error("credential rejected by server")]
    Unauthorized,

    /// Sign-in refused the supplied email/password.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether this error means the session credential must be discarded.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
