use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::error::AuctionError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A team with the same name already exists.
    #[error("{0}")]
    DuplicateName(String),
    /// The debited team does not hold enough points.
    #[error("{0}")]
    InsufficientBalance(String),
    /// The team has no mystery card to spend.
    #[error("{0}")]
    NoCardsAvailable(String),
    /// The effect target is not allowed.
    #[error("{0}")]
    InvalidTarget(String),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
    /// Unexpected failure outside the client's control.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<AuctionError> for ServiceError {
    fn from(err: AuctionError) -> Self {
        let message = err.to_string();
        match err {
            AuctionError::TeamNotFound(_) | AuctionError::ProductNotFound(_) => {
                ServiceError::NotFound(message)
            }
            AuctionError::DuplicateName(_) => ServiceError::DuplicateName(message),
            AuctionError::InsufficientBalance { .. } => ServiceError::InsufficientBalance(message),
            AuctionError::NoCardsAvailable(_) => ServiceError::NoCardsAvailable(message),
            AuctionError::InvalidTarget(_) => ServiceError::InvalidTarget(message),
            AuctionError::MissingTarget(_)
            | AuctionError::InvalidProduct(_)
            | AuctionError::InvalidAmount(_) => ServiceError::InvalidInput(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("{0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with existing data.
    #[error("{0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message)
            | ServiceError::InsufficientBalance(message)
            | ServiceError::NoCardsAvailable(message)
            | ServiceError::InvalidTarget(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::DuplicateName(message) => AppError::Conflict(message),
            ServiceError::Timeout => AppError::ServiceUnavailable("operation timed out".into()),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn status_of(err: AuctionError) -> StatusCode {
        AppError::from(ServiceError::from(err)).status()
    }

    #[test]
    fn auction_errors_map_to_http_statuses() {
        assert_eq!(status_of(AuctionError::TeamNotFound("A".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AuctionError::ProductNotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AuctionError::DuplicateName("A".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuctionError::InsufficientBalance {
                team: "A".into(),
                available: 1,
                requested: 2,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuctionError::NoCardsAvailable("A".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AuctionError::InvalidTarget("A".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AuctionError::InvalidProduct("no image".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn service_level_failures_map_to_unavailable_or_unauthorized() {
        assert_eq!(
            AppError::from(ServiceError::Degraded).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(ServiceError::Timeout).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(ServiceError::Unauthorized("nope".into())).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn duplicate_message_reaches_the_body() {
        let err = AppError::from(ServiceError::from(AuctionError::DuplicateName("Alpha".into())));
        assert_eq!(err.to_string(), "team name `Alpha` already exists");
    }
}
