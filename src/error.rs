//! Error types for the Azkaban client

use thiserror::Error;

/// Result type alias for Azkaban operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Azkaban
#[derive(Debug, Error)]
pub enum Error {
    /// No session is active; login first
    #[error("you are not logged in")]
    NotLoggedIn,

    /// Project archive could not be built
    #[error("archive error: {0}")]
    Archive(String),

    /// The host could not be reached or the request failed in transit
    #[error("could not connect to host: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something that is not a JSON object
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The server reported an `error` in the response body
    #[error("{0}")]
    Api(String),

    /// Schedule request rejected with `status: error`
    #[error("schedule rejected: {0}")]
    Schedule(String),

    /// A success response lacked an expected field
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A local precondition failed before any request was sent
    Precondition,
    /// The request never produced a response
    Transport,
    /// The server returned an `error` key
    Api,
    /// The server accepted the request but refused the operation
    BusinessLogic,
    /// The response did not have the expected shape
    Protocol,
    /// Local configuration, filesystem or serialization failure
    Local,
}

impl Error {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotLoggedIn | Self::Archive(_) => ErrorKind::Precondition,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Api(_) => ErrorKind::Api,
            Self::Schedule(_) => ErrorKind::BusinessLogic,
            Self::InvalidResponse(_) | Self::MissingField(_) => ErrorKind::Protocol,
            Self::Config(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Local,
        }
    }
}
