//! Error taxonomy shared by the services and the HTTP layer.

use axum::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a storefront operation can report.
///
/// The variants map one-to-one onto HTTP statuses (see [`Error::status`]).
/// `Persistence` and `Internal` carry details that are logged but never
/// rendered to clients.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, rejected before any I/O.
    #[error("{0}")]
    Validation(String),

    /// No bearer token was presented.
    #[error("Unauthorized")]
    Unauthorized,

    /// The token is unknown or expired. Both cases share this variant and
    /// message so callers cannot probe the session lifecycle.
    #[error("Invalid session")]
    InvalidSession,

    /// Username or password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The store rejected the operation or could not be reached. Any open
    /// transaction has been rolled back by the time this surfaces.
    #[error("database error: {0}")]
    Persistence(#[from] DbErr),

    /// Anything else: hashing failures, panicked blocking tasks.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized | Error::InvalidSession | Error::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Persistence(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message must be replaced by a generic one before it
    /// reaches a client.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Persistence(_) | Error::Internal(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(Error::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidSession.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFound("Product").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Persistence(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_store_and_internal_errors_are_hidden() {
        assert!(Error::Persistence(DbErr::Custom("boom".into())).is_internal());
        assert!(Error::Internal("join".into()).is_internal());
        assert!(!Error::InvalidSession.is_internal());
        assert!(!Error::validation("Missing required fields").is_internal());
    }
}
