use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rsvp_core::roster::RosterError;
use rsvp_core::{RsvpError, StoreError};
use rsvp_types::api::ErrorBody;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rsvp(#[from] RsvpError),

    #[error("{0}")]
    BadRequest(String),

    /// Also used for non-whitelisted emails so callers cannot probe the list.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Rsvp(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        Self::BadRequest("Invalid request format".into())
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Io(e) => {
                error!("CSV I/O failure: {}", e);
                Self::Internal
            }
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rsvp(err) => match err {
                RsvpError::GuestNotFound
                | RsvpError::RsvpNotFound
                | RsvpError::AdminNotFound
                | RsvpError::InvalidCode => StatusCode::NOT_FOUND,
                RsvpError::Validation(_) => StatusCode::BAD_REQUEST,
                RsvpError::Conflict(_) => StatusCode::CONFLICT,
                RsvpError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Rsvp(RsvpError::Unavailable(source)) => {
                error!("storage unavailable: {:#}", source);
                "Service temporarily unavailable".to_string()
            }
            Self::Rsvp(RsvpError::Conflict(detail)) => {
                error!("write conflict: {}", detail);
                "The record was changed by another request, please retry".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsvp_core::attendees::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(RsvpError::GuestNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(RsvpError::InvalidCode).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(RsvpError::from(ValidationError::NoAttendees)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Conflict("taken".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable(anyhow::anyhow!("disk gone"))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(RosterError::MissingPrimaryGuestColumn).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = ApiError::from(RsvpError::from(ValidationError::PartySizeExceedsMaximum));
        assert_eq!(err.to_string(), "Party size exceeds maximum allowed");
    }
}
