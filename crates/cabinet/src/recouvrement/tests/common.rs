use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::recouvrement::{
    DossierId, DossierRecouvrement, NewCreance, NewDossier, NewPaiement, PaiementId,
    PaiementRecouvrement, RecouvrementRepository, RecouvrementService,
};
use crate::store::{MemoryStore, RepositoryError};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn now() -> NaiveDateTime {
    date(2025, 4, 1).and_hms_opt(14, 0, 0).expect("valid time")
}

pub(super) fn amount(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal")
}

pub(super) fn build_service() -> RecouvrementService<MemoryStore> {
    RecouvrementService::new(Arc::new(MemoryStore::new()))
}

pub(super) fn creance(libelle: &str, montant: &str) -> NewCreance {
    NewCreance {
        libelle: libelle.to_string(),
        montant: amount(montant),
        date_echeance: None,
    }
}

pub(super) fn new_dossier(reference: &str, creances: Vec<NewCreance>) -> NewDossier {
    NewDossier {
        reference: reference.to_string(),
        creancier: "SCI Horizon".to_string(),
        debiteur: "Ets Ndoye & Fils".to_string(),
        creances,
    }
}

pub(super) fn paiement(montant: &str) -> NewPaiement {
    NewPaiement {
        montant: amount(montant),
        date_paiement: date(2025, 4, 15),
        mode_paiement: Some("Virement".to_string()),
        reference: None,
    }
}

pub(super) struct UnavailableRepository;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl RecouvrementRepository for UnavailableRepository {
    fn insert_dossier(
        &self,
        _dossier: DossierRecouvrement,
    ) -> Result<DossierRecouvrement, RepositoryError> {
        Err(offline())
    }

    fn modify_dossier<T, E, F>(&self, _id: DossierId, _change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut DossierRecouvrement) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(offline().into())
    }

    fn fetch_dossier(
        &self,
        _id: DossierId,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        Err(offline())
    }

    fn find_dossier_by_reference(
        &self,
        _reference: &str,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        Err(offline())
    }

    fn list_dossiers(&self) -> Result<Vec<DossierRecouvrement>, RepositoryError> {
        Err(offline())
    }
}

/// Delegates to a [`MemoryStore`], but lands `competing` as a payment on
/// the dossier just before the first change runs, as a concurrent request
/// would between our read and our write.
pub(super) struct RacingPaymentRepository {
    pub(super) inner: Arc<MemoryStore>,
    competing: Mutex<Option<Decimal>>,
}

impl RacingPaymentRepository {
    pub(super) fn new(inner: Arc<MemoryStore>, competing: &str) -> Self {
        Self {
            inner,
            competing: Mutex::new(Some(amount(competing))),
        }
    }
}

impl RecouvrementRepository for RacingPaymentRepository {
    fn insert_dossier(
        &self,
        dossier: DossierRecouvrement,
    ) -> Result<DossierRecouvrement, RepositoryError> {
        self.inner.insert_dossier(dossier)
    }

    fn modify_dossier<T, E, F>(&self, id: DossierId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut DossierRecouvrement) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let competing = self.competing.lock().expect("competing lock").take();
        if let Some(montant) = competing {
            self.inner.modify_dossier(id, |dossier| {
                dossier.paiements.push(PaiementRecouvrement {
                    id: PaiementId(9_000),
                    montant,
                    date_paiement: date(2025, 4, 14),
                    mode_paiement: Some("Espèces".to_string()),
                    reference: None,
                });
                Ok::<_, RepositoryError>(())
            })?;
        }
        self.inner.modify_dossier(id, change)
    }

    fn fetch_dossier(
        &self,
        id: DossierId,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        self.inner.fetch_dossier(id)
    }

    fn find_dossier_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        self.inner.find_dossier_by_reference(reference)
    }

    fn list_dossiers(&self) -> Result<Vec<DossierRecouvrement>, RepositoryError> {
        self.inner.list_dossiers()
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

pub(super) fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .expect("decimal string")
}
