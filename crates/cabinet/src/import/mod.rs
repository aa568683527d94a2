//! Spreadsheet templates and bulk import of buildings, lots and tenants.

mod reader;
pub mod router;
mod schema;
mod service;
mod template;

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::web::error_response;

pub use reader::{ImportFormat, XLSX_CONTENT_TYPE};
pub use router::import_router;
pub use schema::{Column, EntityKind};
pub use service::{FieldError, ImportReport, RowOutcome, RowStatus, SpreadsheetImporter};
pub use template::{generate_template, HELP_SHEET};

/// Failures that abort a whole import or template request. Problems local
/// to a row are reported in [`ImportReport`] instead.
#[derive(Debug)]
pub enum ImportError {
    UnknownKind(String),
    Csv(csv::Error),
    Workbook(calamine::XlsxError),
    EmptyWorkbook,
    Template(rust_xlsxwriter::XlsxError),
    Io(std::io::Error),
}

impl ImportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImportError::UnknownKind(_) => StatusCode::NOT_FOUND,
            ImportError::Csv(_) | ImportError::Workbook(_) | ImportError::EmptyWorkbook => {
                StatusCode::BAD_REQUEST
            }
            ImportError::Template(_) | ImportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::UnknownKind(kind) => write!(
                f,
                "unknown import kind '{kind}', expected immeubles, lots or locataires"
            ),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {err}"),
            ImportError::Workbook(err) => write!(f, "unreadable xlsx workbook: {err}"),
            ImportError::EmptyWorkbook => write!(f, "workbook contains no worksheet"),
            ImportError::Template(err) => write!(f, "failed to build template: {err}"),
            ImportError::Io(err) => write!(f, "failed to read spreadsheet: {err}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Csv(err) => Some(err),
            ImportError::Workbook(err) => Some(err),
            ImportError::Template(err) => Some(err),
            ImportError::Io(err) => Some(err),
            ImportError::UnknownKind(_) | ImportError::EmptyWorkbook => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Workbook(err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Template(err)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "import failure");
        }
        error_response(status, self.to_string())
    }
}

impl EntityKind {
    pub fn from_slug(raw: &str) -> Result<Self, ImportError> {
        Self::parse(raw).ok_or_else(|| ImportError::UnknownKind(raw.to_string()))
    }
}
