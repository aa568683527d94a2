use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDateTime};

use super::domain::{AffaireId, AudienceId};
use super::repository::ContentieuxRepository;
use super::requests::{
    AudienceFilter, NewAffaire, NewAudience, NewResultat, ReminderQuery, UpdateAffaireStatut,
};
use super::service::ContentieuxService;
use crate::error::ServiceError;
use crate::web::ValidatedJson;

type SharedService<R> = State<Arc<ContentieuxService<R>>>;

/// Router builder exposing case and hearing endpoints.
pub fn contentieux_router<R>(service: Arc<ContentieuxService<R>>) -> Router
where
    R: ContentieuxRepository + 'static,
{
    Router::new()
        .route(
            "/api/contentieux/affaires",
            post(create_affaire_handler::<R>).get(list_affaires_handler::<R>),
        )
        .route(
            "/api/contentieux/affaires/:affaire_id",
            get(get_affaire_handler::<R>),
        )
        .route(
            "/api/contentieux/affaires/:affaire_id/statut",
            put(update_affaire_statut_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences",
            post(schedule_audience_handler::<R>).get(list_audiences_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences/rappels",
            get(reminders_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences/statistiques",
            get(statistics_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences/:audience_id",
            get(get_audience_handler::<R>).delete(delete_audience_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences/:audience_id/resultats",
            post(record_resultat_handler::<R>).get(list_resultats_handler::<R>),
        )
        .route(
            "/api/contentieux/audiences/:audience_id/enrolement",
            put(enrolement_handler::<R>),
        )
        .with_state(service)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) async fn create_affaire_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewAffaire>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let affaire = service.create_affaire(request, now())?;
    Ok((StatusCode::CREATED, Json(affaire)).into_response())
}

pub(crate) async fn list_affaires_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let affaires = service.list_affaires()?;
    Ok(Json(affaires).into_response())
}

pub(crate) async fn get_affaire_handler<R>(
    State(service): SharedService<R>,
    Path(affaire_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let affaire = service.get_affaire(AffaireId(affaire_id))?;
    Ok(Json(affaire).into_response())
}

pub(crate) async fn update_affaire_statut_handler<R>(
    State(service): SharedService<R>,
    Path(affaire_id): Path<u64>,
    ValidatedJson(request): ValidatedJson<UpdateAffaireStatut>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let affaire = service.update_affaire_statut(AffaireId(affaire_id), request.statut)?;
    Ok(Json(affaire).into_response())
}

pub(crate) async fn schedule_audience_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewAudience>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let audience = service.schedule_audience(request, now())?;
    Ok((StatusCode::CREATED, Json(audience)).into_response())
}

pub(crate) async fn list_audiences_handler<R>(
    State(service): SharedService<R>,
    Query(filter): Query<AudienceFilter>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let audiences = service.list_audiences(&filter, now())?;
    Ok(Json(audiences).into_response())
}

pub(crate) async fn get_audience_handler<R>(
    State(service): SharedService<R>,
    Path(audience_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let audience = service.get_audience(AudienceId(audience_id), now())?;
    Ok(Json(audience).into_response())
}

pub(crate) async fn delete_audience_handler<R>(
    State(service): SharedService<R>,
    Path(audience_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    service.delete_audience(AudienceId(audience_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn record_resultat_handler<R>(
    State(service): SharedService<R>,
    Path(audience_id): Path<u64>,
    ValidatedJson(request): ValidatedJson<NewResultat>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let outcome = service.record_resultat(AudienceId(audience_id), request, now())?;
    Ok((StatusCode::CREATED, Json(outcome)).into_response())
}

pub(crate) async fn list_resultats_handler<R>(
    State(service): SharedService<R>,
    Path(audience_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let resultats = service.resultats(AudienceId(audience_id))?;
    Ok(Json(resultats).into_response())
}

pub(crate) async fn enrolement_handler<R>(
    State(service): SharedService<R>,
    Path(audience_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let audience = service.mark_enrolement_effectue(AudienceId(audience_id), now())?;
    Ok(Json(audience).into_response())
}

pub(crate) async fn reminders_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<ReminderQuery>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let reminders = service.reminders(query.echeance, now())?;
    Ok(Json(reminders).into_response())
}

pub(crate) async fn statistics_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: ContentieuxRepository + 'static,
{
    let statistics = service.statistics(now())?;
    Ok(Json(statistics).into_response())
}
