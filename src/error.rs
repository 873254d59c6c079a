use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::attendance::geofence::MAX_DISTANCE_METERS;

/// Every failure a request can end with. All of them are recovered at the
/// handler boundary and rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("email already registered")]
    AlreadyRegistered,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token required")]
    TokenRequired,

    #[error("invalid token")]
    Unauthorized,

    #[error("invalid coordinates")]
    InvalidCoordinate,

    #[error("You are {:.0}m from the hospital. You must be within {}m.", .0, MAX_DISTANCE_METERS)]
    OutOfRange(f64),

    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("only administrators can view this information")]
    Forbidden,

    #[error("invalid request body")]
    InvalidBody,

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AlreadyRegistered | AppError::AlreadyCheckedIn => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::TokenRequired | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InvalidCoordinate | AppError::InvalidBody => StatusCode::BAD_REQUEST,
            AppError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Existing clients expect `200 OK` with an `error` field; `strict` opts
    /// into real status codes with the same body.
    pub fn to_response(&self, strict: bool) -> HttpResponse {
        if let AppError::Internal(e) = self {
            tracing::error!(error = ?e, "Request failed");
        }

        let status = if strict {
            self.status_code()
        } else {
            StatusCode::OK
        };

        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
