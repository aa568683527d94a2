//! Cross-cutting HTTP plumbing shared by the domain routers.

pub mod logging;
pub mod validation;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub use logging::log_requests;
pub use validation::{FieldErrors, Validate, ValidatedJson, ValidationRejection};

/// JSON `{"error": ...}` body used by every non-validation failure.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}
