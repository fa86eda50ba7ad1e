use openshelf_http::HttpError;
use thiserror::Error;

/// A user setting that failed local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSetting {
    #[error("Invalid limit value. It must be a positive number.")]
    Limit,
    #[error("Invalid publish year from value. It must be a number.")]
    PublishYearFrom,
    #[error("Invalid publish year to value. It must be a number.")]
    PublishYearTo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Rejected before any request was sent.
    #[error(transparent)]
    InvalidInput(#[from] InvalidSetting),

    /// The search service answered with a non-success status.
    #[error("Open Library API request failed: {message} ({status})")]
    Upstream { status: u16, message: String },

    /// Transport failure or an unreadable body.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Coarse failure class, for callers that branch without matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Upstream,
    Unexpected,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<HttpError> for SearchError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Api { status, message } => Self::Upstream {
                status: status.as_u16(),
                message,
            },
            other => Self::Unexpected(other.to_string()),
        }
    }
}
