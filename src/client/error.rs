use thiserror::Error;
use crate::client::config::ConfigError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with something other than JSON.
    #[error("Incorrect response (content type {content_type:?}): {body}")]
    Protocol {
        content_type: Option<String>,
        body: String,
    },

    /// Credentials rejected at login, or the token stayed invalid after the
    /// one permitted refresh.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The refresh token itself was rejected.
    #[error("Token refresh rejected: {0}")]
    Refresh(String),

    #[error("Registration rejected: {0}")]
    Registration(String),

    #[error("Incorrect analytics parameters: {0}")]
    Parameter(String),

    /// A driver operation named a user index that was never created.
    #[error("No generated user #{0}")]
    UnknownUser(usize),

    /// A JSON error response that is not covered by the variants above.
    #[error("Request rejected with status {status}: {body}")]
    Rejected {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
