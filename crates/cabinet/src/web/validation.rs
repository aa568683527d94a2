//! Declarative request validation.
//!
//! DTOs implement [`Validate`]; handlers take [`ValidatedJson`] so invalid
//! payloads are rejected with a field-keyed 400 before reaching a service.
//! A body that is well-formed JSON but does not fit the DTO (missing field,
//! wrong type, unknown enum variant) gets the same field-keyed 400; only
//! malformed JSON is reported as `invalid_json`. Unknown JSON fields are
//! ignored unless the DTO opts into `#[serde(deny_unknown_fields)]`.

use std::collections::BTreeMap;
use std::fmt;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Validation messages grouped by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{field} must not be empty"));
        }
    }

    pub fn require_positive(&mut self, field: &str, value: Decimal) {
        if value <= Decimal::ZERO {
            self.add(field, format!("{field} must be greater than 0"));
        }
    }

    pub fn require_non_negative(&mut self, field: &str, value: Decimal) {
        if value < Decimal::ZERO {
            self.add(field, format!("{field} must not be negative"));
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (index, (field, messages)) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field} ({})", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Implemented by request bodies carrying field constraints.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// JSON extractor that runs [`Validate`] after deserialization.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Err(ValidationRejection::MissingJsonContentType);
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ValidationRejection::Body)?;
        let value = deserialize::<T>(&bytes)?;
        value.validate().map_err(ValidationRejection::Fields)?;
        Ok(Self(value))
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map_or(false, |mime| {
            mime.type_() == mime::APPLICATION
                && (mime.subtype() == mime::JSON
                    || mime.suffix().map_or(false, |suffix| suffix == mime::JSON))
        })
}

fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ValidationRejection> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        let message = without_position(&inner.to_string());
        match inner.classify() {
            serde_json::error::Category::Data => {
                let field = field_key(&path, &message);
                ValidationRejection::Fields(FieldErrors::single(field, message))
            }
            _ => ValidationRejection::Syntax(message),
        }
    })?;
    deserializer
        .end()
        .map_err(|err| ValidationRejection::Syntax(without_position(&err.to_string())))?;
    Ok(value)
}

/// serde_json appends `at line L column C` to every message.
fn without_position(message: &str) -> String {
    message
        .rsplit_once(" at line ")
        .map_or(message, |(text, _)| text)
        .to_string()
}

/// Key for a data error: the offending path, extended with the field named
/// by a missing or unknown field message. `body` for the document root.
fn field_key(path: &str, message: &str) -> String {
    let named = ["missing field `", "unknown field `"]
        .iter()
        .find_map(|prefix| message.strip_prefix(prefix))
        .and_then(|rest| rest.split('`').next());
    match (path, named) {
        (".", Some(name)) => name.to_string(),
        (".", None) => "body".to_string(),
        (path, Some(name)) if path != name && !path.ends_with(&format!(".{name}")) => {
            format!("{path}.{name}")
        }
        (path, _) => path.to_string(),
    }
}

#[derive(Debug)]
pub enum ValidationRejection {
    MissingJsonContentType,
    Body(BytesRejection),
    Syntax(String),
    Fields(FieldErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ValidationRejection::MissingJsonContentType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            ValidationRejection::Body(rejection) => (rejection.status(), rejection.body_text()),
            ValidationRejection::Syntax(message) => (StatusCode::BAD_REQUEST, message),
            ValidationRejection::Fields(errors) => return validation_failed(&errors),
        };
        let payload = json!({
            "status": status.as_u16(),
            "error": "invalid_json",
            "message": message,
        });
        (status, Json(payload)).into_response()
    }
}

/// Structured 400 listing the messages of every invalid field.
pub fn validation_failed(errors: &FieldErrors) -> Response {
    let payload = json!({
        "status": StatusCode::BAD_REQUEST.as_u16(),
        "error": "validation_failed",
        "message": errors,
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}
