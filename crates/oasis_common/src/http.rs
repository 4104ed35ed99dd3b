// --- File: crates/oasis_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, OasisError};

/// Extension trait for OasisError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for OasisError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();

        // JSON error envelope; the `with` booking id rides along on conflicts
        // so the operator sees what they collided with.
        let body = match &self {
            OasisError::Conflict { with, .. } => Json(json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                    "conflicting_booking_id": with,
                }
            })),
            _ => Json(json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                }
            })),
        };

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for OasisError to make it easier to use in Axum handlers.
impl IntoResponse for OasisError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a Result<T, OasisError> into a Result<Json<T>, Response>.
/// Useful for Axum handlers that return a JSON response.
pub fn handle_json_result<T>(result: Result<T, OasisError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}
