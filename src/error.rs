use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the key-value capability backing the session stores.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced to callers of the API client and session stores.
///
/// Guard and authenticator never produce these: a missing or unreadable
/// credential is an unauthenticated request, not a failure.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Raised by the navigator when guard redirects never settle.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavigationError {
    #[error("redirect loop while navigating to {target}: {chain:?}")]
    RedirectLoop { target: String, chain: Vec<String> },
}
