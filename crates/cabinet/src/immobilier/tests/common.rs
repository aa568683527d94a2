use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::immobilier::{
    Bail, BailId, DepenseImmeuble, EncaissementLoyer, Immeuble, ImmeubleId, ImmobilierRepository,
    ImmobilierService, InactiveLeasePolicy, Locataire, LocataireId, Lot, LotId, LotType,
    NewBail, NewImmeuble, NewLocataire, NewLot, Periode,
};
use crate::store::{MemoryStore, RepositoryError};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn periode(raw: &str) -> Periode {
    raw.parse().expect("valid periode")
}

pub(super) fn amount(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(super) fn build_service(
    policy: InactiveLeasePolicy,
) -> (ImmobilierService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ImmobilierService::new(store.clone(), policy), store)
}

pub(super) fn new_immeuble(nom: &str) -> NewImmeuble {
    NewImmeuble {
        nom: nom.to_string(),
        adresse: "Rue 10, Point E".to_string(),
        ville: Some("Dakar".to_string()),
        proprietaire: None,
    }
}

pub(super) fn new_lot(immeuble_id: ImmeubleId, numero: &str, loyer: i64) -> NewLot {
    NewLot {
        immeuble_id,
        numero: numero.to_string(),
        type_lot: LotType::F2,
        etage: Some(1),
        superficie: None,
        loyer_mensuel: amount(loyer),
        statut: None,
    }
}

pub(super) fn new_locataire(nom: &str) -> NewLocataire {
    NewLocataire {
        nom: nom.to_string(),
        prenom: None,
        telephone: None,
        email: None,
    }
}

pub(super) fn new_bail(locataire_id: LocataireId, lot_id: LotId, debut: NaiveDate) -> NewBail {
    NewBail {
        locataire_id,
        lot_id,
        montant_loyer: None,
        jour_echeance: None,
        date_debut: debut,
        date_fin: None,
    }
}

/// One building with one lot let to one tenant from January 2025.
pub(super) struct Leased {
    pub(super) immeuble: Immeuble,
    pub(super) lot: Lot,
    pub(super) locataire: Locataire,
    pub(super) bail: Bail,
}

pub(super) fn seed_leased_lot(
    service: &ImmobilierService<MemoryStore>,
    nom: &str,
    loyer: i64,
) -> Leased {
    let immeuble = service
        .create_immeuble(new_immeuble(nom))
        .expect("immeuble created");
    let lot = service
        .create_lot(new_lot(immeuble.id, "A1", loyer))
        .expect("lot created");
    let locataire = service
        .create_locataire(new_locataire("Ba"))
        .expect("locataire created");
    let bail = service
        .create_bail(new_bail(locataire.id, lot.id, date(2025, 1, 1)))
        .expect("bail created");
    Leased {
        immeuble,
        lot,
        locataire,
        bail,
    }
}

pub(super) struct UnavailableRepository;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl ImmobilierRepository for UnavailableRepository {
    fn insert_immeuble(&self, _immeuble: Immeuble) -> Result<Immeuble, RepositoryError> {
        Err(offline())
    }

    fn fetch_immeuble(&self, _id: ImmeubleId) -> Result<Option<Immeuble>, RepositoryError> {
        Err(offline())
    }

    fn list_immeubles(&self) -> Result<Vec<Immeuble>, RepositoryError> {
        Err(offline())
    }

    fn insert_lot(&self, _lot: Lot) -> Result<Lot, RepositoryError> {
        Err(offline())
    }

    fn update_lot(&self, _lot: Lot) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_lot(&self, _id: LotId) -> Result<Option<Lot>, RepositoryError> {
        Err(offline())
    }

    fn list_lots(&self) -> Result<Vec<Lot>, RepositoryError> {
        Err(offline())
    }

    fn insert_locataire(&self, _locataire: Locataire) -> Result<Locataire, RepositoryError> {
        Err(offline())
    }

    fn update_locataire(&self, _locataire: Locataire) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_locataire(&self, _id: LocataireId) -> Result<Option<Locataire>, RepositoryError> {
        Err(offline())
    }

    fn list_locataires(&self) -> Result<Vec<Locataire>, RepositoryError> {
        Err(offline())
    }

    fn insert_bail(&self, _bail: Bail) -> Result<Bail, RepositoryError> {
        Err(offline())
    }

    fn update_bail(&self, _bail: Bail) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_bail(&self, _id: BailId) -> Result<Option<Bail>, RepositoryError> {
        Err(offline())
    }

    fn list_baux(&self) -> Result<Vec<Bail>, RepositoryError> {
        Err(offline())
    }

    fn insert_encaissement(
        &self,
        _encaissement: EncaissementLoyer,
    ) -> Result<EncaissementLoyer, RepositoryError> {
        Err(offline())
    }

    fn list_encaissements(&self) -> Result<Vec<EncaissementLoyer>, RepositoryError> {
        Err(offline())
    }

    fn insert_depense(
        &self,
        _depense: DepenseImmeuble,
    ) -> Result<DepenseImmeuble, RepositoryError> {
        Err(offline())
    }

    fn list_depenses(&self) -> Result<Vec<DepenseImmeuble>, RepositoryError> {
        Err(offline())
    }
}

pub(super) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Decimal fields serialize as strings.
pub(super) fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .expect("decimal string")
}
