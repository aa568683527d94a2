use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::contentieux::domain::{
    Affaire, AffaireId, Audience, AudienceId, ResultatAudience, ResultatId, TypeAudience,
    TypeResultat,
};
use crate::contentieux::repository::ContentieuxRepository;
use crate::contentieux::requests::{NewAffaire, NewAudience};
use crate::contentieux::status::refresh_statut;
use crate::contentieux::ContentieuxService;
use crate::store::{MemoryStore, RepositoryError};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn now() -> NaiveDateTime {
    date(2025, 6, 2).and_hms_opt(9, 0, 0).expect("valid time")
}

pub(super) fn build_service() -> (ContentieuxService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ContentieuxService::new(store.clone()), store)
}

pub(super) fn new_affaire(reference: &str) -> NewAffaire {
    NewAffaire {
        reference: reference.to_string(),
        intitule: "SCI Horizon c/ Diop".to_string(),
        juridiction: Some("Tribunal de commerce de Dakar".to_string()),
    }
}

pub(super) fn new_audience(affaire_id: AffaireId, day: NaiveDate) -> NewAudience {
    NewAudience {
        affaire_id,
        date: day,
        heure: NaiveTime::from_hms_opt(10, 30, 0),
        type_audience: TypeAudience::Plaidoirie,
        juridiction: None,
        salle: Some("Salle 2".to_string()),
        notes: None,
        rappel_enrolement: false,
        date_rappel_enrolement: None,
    }
}

pub(super) struct UnavailableRepository;

impl ContentieuxRepository for UnavailableRepository {
    fn insert_affaire(&self, _affaire: Affaire) -> Result<Affaire, RepositoryError> {
        Err(offline())
    }

    fn update_affaire(&self, _affaire: Affaire) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch_affaire(&self, _id: AffaireId) -> Result<Option<Affaire>, RepositoryError> {
        Err(offline())
    }

    fn find_affaire_by_reference(
        &self,
        _reference: &str,
    ) -> Result<Option<Affaire>, RepositoryError> {
        Err(offline())
    }

    fn list_affaires(&self) -> Result<Vec<Affaire>, RepositoryError> {
        Err(offline())
    }

    fn insert_audience(&self, _audience: Audience) -> Result<Audience, RepositoryError> {
        Err(offline())
    }

    fn modify_audience<T, E, F>(&self, _id: AudienceId, _change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut Audience) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(offline().into())
    }

    fn fetch_audience(&self, _id: AudienceId) -> Result<Option<Audience>, RepositoryError> {
        Err(offline())
    }

    fn list_audiences(&self) -> Result<Vec<Audience>, RepositoryError> {
        Err(offline())
    }

    fn delete_audience(&self, _id: AudienceId) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

/// Delegates to a [`MemoryStore`], but the first `list_audiences` call
/// records a JUGEMENT on `target` after taking its snapshot, as a
/// concurrent request would. The returned list is the stale snapshot.
pub(super) struct InterleavingRepository {
    pub(super) inner: Arc<MemoryStore>,
    target: Mutex<Option<AudienceId>>,
    decided_at: NaiveDateTime,
}

impl InterleavingRepository {
    pub(super) fn new(
        inner: Arc<MemoryStore>,
        target: AudienceId,
        decided_at: NaiveDateTime,
    ) -> Self {
        Self {
            inner,
            target: Mutex::new(Some(target)),
            decided_at,
        }
    }
}

impl ContentieuxRepository for InterleavingRepository {
    fn insert_affaire(&self, affaire: Affaire) -> Result<Affaire, RepositoryError> {
        self.inner.insert_affaire(affaire)
    }

    fn update_affaire(&self, affaire: Affaire) -> Result<(), RepositoryError> {
        self.inner.update_affaire(affaire)
    }

    fn fetch_affaire(&self, id: AffaireId) -> Result<Option<Affaire>, RepositoryError> {
        self.inner.fetch_affaire(id)
    }

    fn find_affaire_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Affaire>, RepositoryError> {
        self.inner.find_affaire_by_reference(reference)
    }

    fn list_affaires(&self) -> Result<Vec<Affaire>, RepositoryError> {
        self.inner.list_affaires()
    }

    fn insert_audience(&self, audience: Audience) -> Result<Audience, RepositoryError> {
        self.inner.insert_audience(audience)
    }

    fn modify_audience<T, E, F>(&self, id: AudienceId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut Audience) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner.modify_audience(id, change)
    }

    fn fetch_audience(&self, id: AudienceId) -> Result<Option<Audience>, RepositoryError> {
        self.inner.fetch_audience(id)
    }

    fn list_audiences(&self) -> Result<Vec<Audience>, RepositoryError> {
        let snapshot = self.inner.list_audiences()?;
        let target = self.target.lock().expect("target lock").take();
        if let Some(id) = target {
            let decided_at = self.decided_at;
            self.inner.modify_audience(id, |audience| {
                audience.resultats.push(ResultatAudience {
                    id: ResultatId(9_000),
                    type_resultat: TypeResultat::Jugement,
                    nouvelle_date: None,
                    motif_renvoi: None,
                    texte_delibere: Some("Condamne le défendeur".to_string()),
                    created_at: decided_at,
                });
                refresh_statut(audience, decided_at);
                Ok::<_, RepositoryError>(())
            })?;
        }
        Ok(snapshot)
    }

    fn delete_audience(&self, id: AudienceId) -> Result<(), RepositoryError> {
        self.inner.delete_audience(id)
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
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
