use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    Affaire, AffaireId, AffaireStatut, Audience, AudienceId, AudienceStatut, ResultatAudience,
    ResultatId, TypeResultat,
};
use super::repository::ContentieuxRepository;
use super::requests::{AudienceFilter, NewAffaire, NewAudience, NewResultat};
use super::stats::AudienceStatistics;
use super::status::{derive_statut, due_reminders, pending_enrolment_reminders, refresh_statut};
use crate::error::ServiceError;
use crate::web::{FieldErrors, Validate};

static AFFAIRE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static AUDIENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESULTAT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Result of recording a hearing outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ResultatOutcome {
    pub audience: Audience,
    pub resultat: ResultatAudience,
    /// Hearing scheduled at the adjourned date, for a RENVOI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_suivante: Option<Audience>,
}

/// Case and hearing operations. Every read refreshes the cached hearing
/// status against `now` before returning.
pub struct ContentieuxService<R> {
    repository: Arc<R>,
}

impl<R> ContentieuxService<R>
where
    R: ContentieuxRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_affaire(
        &self,
        request: NewAffaire,
        now: NaiveDateTime,
    ) -> Result<Affaire, ServiceError> {
        request.validate()?;
        let reference = request.reference.trim().to_string();
        if self
            .repository
            .find_affaire_by_reference(&reference)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "affaire with reference {reference} already exists"
            )));
        }

        let affaire = Affaire {
            id: AffaireId(AFFAIRE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            reference,
            intitule: request.intitule.trim().to_string(),
            statut: AffaireStatut::Active,
            juridiction: clean(request.juridiction),
            created_at: now,
        };
        let stored = self.repository.insert_affaire(affaire)?;
        info!(affaire_id = stored.id.0, reference = %stored.reference, "affaire created");
        Ok(stored)
    }

    pub fn get_affaire(&self, id: AffaireId) -> Result<Affaire, ServiceError> {
        self.repository
            .fetch_affaire(id)?
            .ok_or_else(|| ServiceError::not_found("affaire", id.0))
    }

    pub fn list_affaires(&self) -> Result<Vec<Affaire>, ServiceError> {
        let mut affaires = self.repository.list_affaires()?;
        affaires.sort_by_key(|affaire| affaire.id);
        Ok(affaires)
    }

    pub fn update_affaire_statut(
        &self,
        id: AffaireId,
        statut: AffaireStatut,
    ) -> Result<Affaire, ServiceError> {
        let mut affaire = self.get_affaire(id)?;
        affaire.statut = statut;
        self.repository.update_affaire(affaire.clone())?;
        info!(affaire_id = id.0, statut = ?statut, "affaire status updated");
        Ok(affaire)
    }

    pub fn schedule_audience(
        &self,
        request: NewAudience,
        now: NaiveDateTime,
    ) -> Result<Audience, ServiceError> {
        request.validate()?;
        let affaire = self.get_affaire(request.affaire_id)?;
        if !affaire.statut.accepts_audiences() {
            return Err(ServiceError::Rule(format!(
                "affaire {} is {} and cannot receive hearings",
                affaire.reference,
                affaire.statut.label()
            )));
        }

        let mut audience = Audience {
            id: AudienceId(AUDIENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            affaire_id: affaire.id,
            date: request.date,
            heure: request.heure,
            type_audience: request.type_audience,
            juridiction: clean(request.juridiction).or(affaire.juridiction),
            salle: clean(request.salle),
            notes: clean(request.notes),
            statut: AudienceStatut::AVenir,
            rappel_enrolement: request.rappel_enrolement,
            date_rappel_enrolement: request.date_rappel_enrolement,
            enrolement_effectue: false,
            resultats: Vec::new(),
            audience_precedente: None,
        };
        refresh_statut(&mut audience, now);

        let stored = self.repository.insert_audience(audience)?;
        info!(
            audience_id = stored.id.0,
            affaire_id = stored.affaire_id.0,
            date = %stored.date,
            "audience scheduled"
        );
        Ok(stored)
    }

    pub fn get_audience(
        &self,
        id: AudienceId,
        now: NaiveDateTime,
    ) -> Result<Audience, ServiceError> {
        let audience = self
            .repository
            .fetch_audience(id)?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))?;
        self.refreshed(audience, now)?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))
    }

    pub fn list_audiences(
        &self,
        filter: &AudienceFilter,
        now: NaiveDateTime,
    ) -> Result<Vec<Audience>, ServiceError> {
        let mut audiences = self
            .all_audiences(now)?
            .into_iter()
            .filter(|audience| filter.matches_schedule(audience.affaire_id, audience.date))
            .filter(|audience| filter.statut.map_or(true, |statut| audience.statut == statut))
            .collect::<Vec<_>>();
        audiences.sort_by_key(|audience| (audience.scheduled_at(), audience.id));
        Ok(audiences)
    }

    /// Hearings with a recorded outcome cannot be removed.
    pub fn delete_audience(&self, id: AudienceId) -> Result<(), ServiceError> {
        let audience = self
            .repository
            .fetch_audience(id)?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))?;
        if audience.has_resultat() {
            return Err(ServiceError::Rule(format!(
                "audience {} has a recorded result and cannot be deleted",
                id.0
            )));
        }
        self.repository.delete_audience(id)?;
        info!(audience_id = id.0, "audience deleted");
        Ok(())
    }

    /// Append an outcome. A RENVOI schedules the follow-up hearing at
    /// `nouvelle_date` on the same affaire.
    pub fn record_resultat(
        &self,
        id: AudienceId,
        request: NewResultat,
        now: NaiveDateTime,
    ) -> Result<ResultatOutcome, ServiceError> {
        request.validate()?;
        let resultat = ResultatAudience {
            id: ResultatId(RESULTAT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            type_resultat: request.type_resultat,
            nouvelle_date: request.nouvelle_date,
            motif_renvoi: clean(request.motif_renvoi),
            texte_delibere: clean(request.texte_delibere),
            created_at: now,
        };

        let audience = self
            .repository
            .modify_audience(id, |audience| {
                if let Some(nouvelle_date) = resultat.nouvelle_date {
                    if nouvelle_date <= audience.date {
                        return Err(ServiceError::from(FieldErrors::single(
                            "nouvelle_date",
                            format!(
                                "nouvelle_date must be after the hearing date {}",
                                audience.date
                            ),
                        )));
                    }
                }
                audience.resultats.push(resultat.clone());
                refresh_statut(audience, now);
                Ok(audience.clone())
            })?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))?;
        info!(
            audience_id = id.0,
            type_resultat = ?resultat.type_resultat,
            "audience result recorded"
        );

        let audience_suivante = match (resultat.type_resultat, resultat.nouvelle_date) {
            (TypeResultat::Renvoi, Some(date)) => {
                Some(self.schedule_follow_up(&audience, date, now)?)
            }
            _ => None,
        };

        Ok(ResultatOutcome {
            audience,
            resultat,
            audience_suivante,
        })
    }

    pub fn resultats(&self, id: AudienceId) -> Result<Vec<ResultatAudience>, ServiceError> {
        let audience = self
            .repository
            .fetch_audience(id)?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))?;
        Ok(audience.resultats)
    }

    /// Idempotent: an already enrolled hearing is returned unchanged.
    pub fn mark_enrolement_effectue(
        &self,
        id: AudienceId,
        now: NaiveDateTime,
    ) -> Result<Audience, ServiceError> {
        self.repository
            .modify_audience(id, |audience| {
                refresh_statut(audience, now);
                if !audience.enrolement_effectue {
                    audience.enrolement_effectue = true;
                    info!(audience_id = id.0, "enrolement marked as done");
                }
                Ok::<_, ServiceError>(audience.clone())
            })?
            .ok_or_else(|| ServiceError::not_found("audience", id.0))
    }

    /// Pending enrolment reminders; restricted to those due by `echeance`
    /// when given.
    pub fn reminders(
        &self,
        echeance: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Result<Vec<Audience>, ServiceError> {
        let audiences = self.all_audiences(now)?;
        let selected = match echeance {
            Some(day) => due_reminders(&audiences, day),
            None => pending_enrolment_reminders(&audiences),
        };
        Ok(selected.into_iter().cloned().collect())
    }

    pub fn statistics(&self, now: NaiveDateTime) -> Result<AudienceStatistics, ServiceError> {
        let audiences = self.all_audiences(now)?;
        Ok(AudienceStatistics::from_audiences(&audiences, now))
    }

    fn schedule_follow_up(
        &self,
        previous: &Audience,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Audience, ServiceError> {
        let mut follow_up = Audience {
            id: AudienceId(AUDIENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            affaire_id: previous.affaire_id,
            date,
            heure: previous.heure,
            type_audience: previous.type_audience,
            juridiction: previous.juridiction.clone(),
            salle: previous.salle.clone(),
            notes: None,
            statut: AudienceStatut::AVenir,
            rappel_enrolement: false,
            date_rappel_enrolement: None,
            enrolement_effectue: false,
            resultats: Vec::new(),
            audience_precedente: Some(previous.id),
        };
        refresh_statut(&mut follow_up, now);
        let stored = self.repository.insert_audience(follow_up)?;
        info!(
            audience_id = stored.id.0,
            previous_id = previous.id.0,
            date = %stored.date,
            "follow-up audience scheduled after renvoi"
        );
        Ok(stored)
    }

    fn all_audiences(&self, now: NaiveDateTime) -> Result<Vec<Audience>, ServiceError> {
        let mut audiences = Vec::new();
        for audience in self.repository.list_audiences()? {
            audiences.extend(self.refreshed(audience, now)?);
        }
        Ok(audiences)
    }

    /// Bring the cached statut of `snapshot` up to date. The statut is
    /// re-derived from the stored record, never from the snapshot, so a
    /// result recorded since the snapshot was taken is kept. `None` when
    /// the hearing was deleted in the meantime.
    fn refreshed(
        &self,
        snapshot: Audience,
        now: NaiveDateTime,
    ) -> Result<Option<Audience>, ServiceError> {
        if derive_statut(&snapshot, now) == snapshot.statut {
            return Ok(Some(snapshot));
        }
        self.repository.modify_audience(snapshot.id, |audience| {
            if refresh_statut(audience, now) {
                debug!(
                    audience_id = audience.id.0,
                    statut = ?audience.statut,
                    "status cache refreshed"
                );
            }
            Ok(audience.clone())
        })
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
