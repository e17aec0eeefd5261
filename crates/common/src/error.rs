//! Error types for findcoloc.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Lifecycle operations return these as structured results rather than
/// panicking; each variant maps 1:1 to a stable error code so callers can
/// render a specific user-facing message.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Sejour not found: {0}")]
    SejourNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Stay lifecycle conflicts ===
    // The payload carries the id of the conflicting record so the caller
    // can surface it.
    #[error("Tenant already has an active stay: {0}")]
    TenantAlreadyHasActiveStay(String),

    #[error("An active stay already exists for this offer and tenant: {0}")]
    DuplicateStay(String),

    #[error("Offer is already occupied by another tenant: {0}")]
    OfferAlreadyOccupied(String),

    #[error("Offer is already rented: {0}")]
    OfferAlreadyRented(String),

    #[error("Feedback of this type was already submitted for this stay")]
    AlreadyReviewed,

    #[error("Review target does not match the stay: {0}")]
    InvalidTarget(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_)
            | Self::UserNotFound(_)
            | Self::OfferNotFound(_)
            | Self::SejourNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) | Self::InvalidTarget(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_)
            | Self::TenantAlreadyHasActiveStay(_)
            | Self::DuplicateStay(_)
            | Self::OfferAlreadyOccupied(_)
            | Self::OfferAlreadyRented(_)
            | Self::AlreadyReviewed => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::ExternalService(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::OfferNotFound(_) => "OFFER_NOT_FOUND",
            Self::SejourNotFound(_) => "SEJOUR_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::TenantAlreadyHasActiveStay(_) => "TENANT_ALREADY_HAS_ACTIVE_STAY",
            Self::DuplicateStay(_) => "DUPLICATE_STAY",
            Self::OfferAlreadyOccupied(_) => "OFFER_ALREADY_OCCUPIED",
            Self::OfferAlreadyRented(_) => "OFFER_ALREADY_RENTED",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
