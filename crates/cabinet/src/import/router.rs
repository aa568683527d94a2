use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::reader::{ImportFormat, XLSX_CONTENT_TYPE};
use super::schema::EntityKind;
use super::service::SpreadsheetImporter;
use super::template::generate_template;
use super::ImportError;
use crate::immobilier::ImmobilierRepository;

type SharedImporter<R> = State<Arc<SpreadsheetImporter<R>>>;

/// Router builder exposing template download and spreadsheet upload.
pub fn import_router<R>(importer: Arc<SpreadsheetImporter<R>>) -> Router
where
    R: ImmobilierRepository + 'static,
{
    Router::new()
        .route(
            "/api/immobilier/import/templates/:kind",
            get(template_handler),
        )
        .route("/api/immobilier/import/:kind", post(import_handler::<R>))
        .with_state(importer)
}

pub(crate) async fn template_handler(Path(kind): Path<String>) -> Result<Response, ImportError> {
    let kind = EntityKind::from_slug(&kind)?;
    let bytes = generate_template(kind)?;
    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.file_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// The body is the raw file; `Content-Type: text/csv` selects CSV parsing.
pub(crate) async fn import_handler<R>(
    State(importer): SharedImporter<R>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ImportError>
where
    R: ImmobilierRepository + 'static,
{
    let kind = EntityKind::from_slug(&kind)?;
    let format = ImportFormat::from_content_type(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
    );
    let report = importer.import(kind, &body, format)?;
    Ok(Json(report).into_response())
}
