//! HTTP mapping for registry errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use mergington::data::ErrorDetail;
use mergington::log;

use crate::services::ActivityError;

impl ActivityError {
    pub fn status(&self) -> StatusCode {
        match self {
            ActivityError::ActivityNotFound(_) | ActivityError::NotSignedUp { .. } => {
                StatusCode::NOT_FOUND
            }
            ActivityError::AlreadySignedUp { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        let status = self.status();
        log::warn!(status = status.as_u16(), error = ?self, "Request rejected");

        let body = Json(ErrorDetail {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}
