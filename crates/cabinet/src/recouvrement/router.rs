use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;

use super::domain::DossierId;
use super::repository::RecouvrementRepository;
use super::requests::{NewCreance, NewDossier, NewPaiement};
use super::service::RecouvrementService;
use crate::error::ServiceError;
use crate::web::ValidatedJson;

type SharedService<R> = State<Arc<RecouvrementService<R>>>;

/// Router builder exposing debt-recovery endpoints.
pub fn recouvrement_router<R>(service: Arc<RecouvrementService<R>>) -> Router
where
    R: RecouvrementRepository + 'static,
{
    Router::new()
        .route(
            "/api/recouvrement/dossiers",
            post(create_dossier_handler::<R>).get(list_dossiers_handler::<R>),
        )
        .route(
            "/api/recouvrement/dossiers/:dossier_id",
            get(get_dossier_handler::<R>),
        )
        .route(
            "/api/recouvrement/dossiers/:dossier_id/creances",
            post(add_creance_handler::<R>),
        )
        .route(
            "/api/recouvrement/dossiers/:dossier_id/paiements",
            post(record_paiement_handler::<R>),
        )
        .route(
            "/api/recouvrement/statistiques",
            get(statistics_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn create_dossier_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewDossier>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    let dossier = service.create_dossier(request, Local::now().naive_local())?;
    Ok((StatusCode::CREATED, Json(dossier)).into_response())
}

pub(crate) async fn list_dossiers_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    Ok(Json(service.list_dossiers()?).into_response())
}

pub(crate) async fn get_dossier_handler<R>(
    State(service): SharedService<R>,
    Path(dossier_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    Ok(Json(service.get_dossier(DossierId(dossier_id))?).into_response())
}

pub(crate) async fn add_creance_handler<R>(
    State(service): SharedService<R>,
    Path(dossier_id): Path<u64>,
    ValidatedJson(request): ValidatedJson<NewCreance>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    let dossier = service.add_creance(DossierId(dossier_id), request)?;
    Ok((StatusCode::CREATED, Json(dossier)).into_response())
}

pub(crate) async fn record_paiement_handler<R>(
    State(service): SharedService<R>,
    Path(dossier_id): Path<u64>,
    ValidatedJson(request): ValidatedJson<NewPaiement>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    let dossier = service.record_paiement(DossierId(dossier_id), request)?;
    Ok((StatusCode::CREATED, Json(dossier)).into_response())
}

pub(crate) async fn statistics_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: RecouvrementRepository + 'static,
{
    Ok(Json(service.statistics()?).into_response())
}
