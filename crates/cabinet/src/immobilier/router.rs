use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Local;

use super::domain::{BailId, ImmeubleId, LocataireId, LotId};
use super::periode::Periode;
use super::repository::ImmobilierRepository;
use super::requests::{
    LotFilter, NewBail, NewDepense, NewEncaissement, NewImmeuble, NewLocataire, NewLot,
    PeriodeQuery, ResiliationBail,
};
use super::service::ImmobilierService;
use crate::error::ServiceError;
use crate::web::ValidatedJson;

type SharedService<R> = State<Arc<ImmobilierService<R>>>;

/// Router builder exposing building, lease and rent endpoints.
pub fn immobilier_router<R>(service: Arc<ImmobilierService<R>>) -> Router
where
    R: ImmobilierRepository + 'static,
{
    Router::new()
        .route(
            "/api/immobilier/immeubles",
            post(create_immeuble_handler::<R>).get(list_immeubles_handler::<R>),
        )
        .route(
            "/api/immobilier/immeubles/:immeuble_id",
            get(get_immeuble_handler::<R>),
        )
        .route(
            "/api/immobilier/immeubles/:immeuble_id/bilan",
            get(bilan_handler::<R>),
        )
        .route(
            "/api/immobilier/lots",
            post(create_lot_handler::<R>).get(list_lots_handler::<R>),
        )
        .route("/api/immobilier/lots/:lot_id", get(get_lot_handler::<R>))
        .route(
            "/api/immobilier/locataires",
            post(create_locataire_handler::<R>).get(list_locataires_handler::<R>),
        )
        .route(
            "/api/immobilier/locataires/:locataire_id",
            get(get_locataire_handler::<R>),
        )
        .route(
            "/api/immobilier/baux",
            post(create_bail_handler::<R>).get(list_baux_handler::<R>),
        )
        .route(
            "/api/immobilier/baux/:bail_id/resilier",
            put(resilier_bail_handler::<R>),
        )
        .route(
            "/api/immobilier/encaissements",
            post(record_encaissement_handler::<R>).get(list_encaissements_handler::<R>),
        )
        .route(
            "/api/immobilier/depenses",
            post(record_depense_handler::<R>).get(list_depenses_handler::<R>),
        )
        .route(
            "/api/immobilier/loyers/impayes",
            get(impayes_handler::<R>),
        )
        .route("/api/immobilier/dashboard", get(dashboard_handler::<R>))
        .with_state(service)
}

fn periode_or_current(query: PeriodeQuery) -> Periode {
    query
        .periode
        .unwrap_or_else(|| Periode::containing(Local::now().date_naive()))
}

pub(crate) async fn create_immeuble_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewImmeuble>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let immeuble = service.create_immeuble(request)?;
    Ok((StatusCode::CREATED, Json(immeuble)).into_response())
}

pub(crate) async fn list_immeubles_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_immeubles()?).into_response())
}

pub(crate) async fn get_immeuble_handler<R>(
    State(service): SharedService<R>,
    Path(immeuble_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.get_immeuble(ImmeubleId(immeuble_id))?).into_response())
}

pub(crate) async fn bilan_handler<R>(
    State(service): SharedService<R>,
    Path(immeuble_id): Path<u64>,
    Query(query): Query<PeriodeQuery>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let bilan = service.bilan(ImmeubleId(immeuble_id), periode_or_current(query))?;
    Ok(Json(bilan).into_response())
}

pub(crate) async fn create_lot_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewLot>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let lot = service.create_lot(request)?;
    Ok((StatusCode::CREATED, Json(lot)).into_response())
}

pub(crate) async fn list_lots_handler<R>(
    State(service): SharedService<R>,
    Query(filter): Query<LotFilter>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_lots(&filter)?).into_response())
}

pub(crate) async fn get_lot_handler<R>(
    State(service): SharedService<R>,
    Path(lot_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.get_lot(LotId(lot_id))?).into_response())
}

pub(crate) async fn create_locataire_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewLocataire>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let locataire = service.create_locataire(request)?;
    Ok((StatusCode::CREATED, Json(locataire)).into_response())
}

pub(crate) async fn list_locataires_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_locataires()?).into_response())
}

pub(crate) async fn get_locataire_handler<R>(
    State(service): SharedService<R>,
    Path(locataire_id): Path<u64>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.get_locataire(LocataireId(locataire_id))?).into_response())
}

pub(crate) async fn create_bail_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewBail>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let bail = service.create_bail(request)?;
    Ok((StatusCode::CREATED, Json(bail)).into_response())
}

pub(crate) async fn list_baux_handler<R>(
    State(service): SharedService<R>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_baux()?).into_response())
}

pub(crate) async fn resilier_bail_handler<R>(
    State(service): SharedService<R>,
    Path(bail_id): Path<u64>,
    ValidatedJson(request): ValidatedJson<ResiliationBail>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let bail = service.resilier_bail(BailId(bail_id), request)?;
    Ok(Json(bail).into_response())
}

pub(crate) async fn record_encaissement_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewEncaissement>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let encaissement = service.record_encaissement(request)?;
    Ok((StatusCode::CREATED, Json(encaissement)).into_response())
}

pub(crate) async fn list_encaissements_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<PeriodeQuery>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_encaissements(query.periode)?).into_response())
}

pub(crate) async fn record_depense_handler<R>(
    State(service): SharedService<R>,
    ValidatedJson(request): ValidatedJson<NewDepense>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    let depense = service.record_depense(request)?;
    Ok((StatusCode::CREATED, Json(depense)).into_response())
}

pub(crate) async fn list_depenses_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<PeriodeQuery>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.list_depenses(query.periode)?).into_response())
}

pub(crate) async fn impayes_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<PeriodeQuery>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.impayes(periode_or_current(query))?).into_response())
}

pub(crate) async fn dashboard_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<PeriodeQuery>,
) -> Result<Response, ServiceError>
where
    R: ImmobilierRepository + 'static,
{
    Ok(Json(service.dashboard(periode_or_current(query))?).into_response())
}
