use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code. The message is the one
    /// reported by the provider, passed through untouched.
    #[error("{1} (Status {0})")]
    StatusCode(StatusCode, String),
    /// The response from the provider was unexpected.
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

impl ServiceError {
    /// Whether the provider reported that the addressed resource does not
    /// exist. Vector stores that were just deleted keep answering this way
    /// for a short while.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::StatusCode(status, message) => {
                *status == StatusCode::NOT_FOUND || message.to_lowercase().contains("not found")
            }
            Self::InvalidInput(_) | Self::Transport(_) | Self::Invariant(..) => false,
        }
    }

    /// The HTTP status returned by the provider, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::StatusCode(status, _) => Some(*status),
            Self::Transport(error) => error.status(),
            Self::InvalidInput(_) | Self::Invariant(..) => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
