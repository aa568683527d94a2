use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::domain::{
    Creance, CreanceId, DossierId, DossierRecouvrement, DossierSummary, PaiementId,
    PaiementRecouvrement,
};
use super::repository::RecouvrementRepository;
use super::requests::{NewCreance, NewDossier, NewPaiement};
use super::stats::RecouvrementStatistics;
use crate::error::ServiceError;
use crate::web::Validate;

static DOSSIER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CREANCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PAIEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Debt-recovery operations. Totals are always derived from the stored
/// claims and payments.
pub struct RecouvrementService<R> {
    repository: Arc<R>,
}

impl<R> RecouvrementService<R>
where
    R: RecouvrementRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_dossier(
        &self,
        request: NewDossier,
        now: NaiveDateTime,
    ) -> Result<DossierSummary, ServiceError> {
        request.validate()?;
        let reference = request.reference.trim().to_string();
        if self
            .repository
            .find_dossier_by_reference(&reference)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "dossier with reference {reference} already exists"
            )));
        }

        let dossier = DossierRecouvrement {
            id: DossierId(DOSSIER_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            reference,
            creancier: request.creancier.trim().to_string(),
            debiteur: request.debiteur.trim().to_string(),
            created_at: now,
            creances: request.creances.into_iter().map(new_creance).collect(),
            paiements: Vec::new(),
        };
        let stored = self.repository.insert_dossier(dossier)?;
        info!(
            dossier_id = stored.id.0,
            reference = %stored.reference,
            total = %stored.total_a_recouvrer(),
            "dossier de recouvrement created"
        );
        Ok(stored.into())
    }

    pub fn get_dossier(&self, id: DossierId) -> Result<DossierSummary, ServiceError> {
        self.fetch(id).map(DossierSummary::from)
    }

    pub fn list_dossiers(&self) -> Result<Vec<DossierSummary>, ServiceError> {
        let mut dossiers = self.repository.list_dossiers()?;
        dossiers.sort_by_key(|dossier| dossier.id);
        Ok(dossiers.into_iter().map(DossierSummary::from).collect())
    }

    pub fn add_creance(
        &self,
        id: DossierId,
        request: NewCreance,
    ) -> Result<DossierSummary, ServiceError> {
        request.validate()?;
        let creance = new_creance(request);
        let dossier = self
            .repository
            .modify_dossier(id, |dossier| {
                dossier.creances.push(creance.clone());
                Ok::<_, ServiceError>(dossier.clone())
            })?
            .ok_or_else(|| ServiceError::not_found("dossier", id.0))?;
        info!(
            dossier_id = id.0,
            creance_id = creance.id.0,
            montant = %creance.montant,
            "creance added"
        );
        Ok(dossier.into())
    }

    /// A payment may not exceed the remaining balance.
    pub fn record_paiement(
        &self,
        id: DossierId,
        request: NewPaiement,
    ) -> Result<DossierSummary, ServiceError> {
        request.validate()?;
        let montant = request.montant.round_dp(2);
        let paiement = PaiementRecouvrement {
            id: PaiementId(PAIEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            montant,
            date_paiement: request.date_paiement,
            mode_paiement: clean(request.mode_paiement),
            reference: clean(request.reference),
        };

        // Balance checked against the stored dossier while it is locked.
        let dossier = self
            .repository
            .modify_dossier(id, |dossier| {
                let solde = dossier.solde_restant();
                if montant > solde {
                    return Err(ServiceError::Rule(format!(
                        "payment of {montant} exceeds the remaining balance {solde} of dossier {}",
                        dossier.reference
                    )));
                }
                dossier.paiements.push(paiement);
                Ok(dossier.clone())
            })?
            .ok_or_else(|| ServiceError::not_found("dossier", id.0))?;
        info!(
            dossier_id = id.0,
            montant = %montant,
            solde_restant = %dossier.solde_restant(),
            "recovery payment recorded"
        );
        Ok(dossier.into())
    }

    pub fn statistics(&self) -> Result<RecouvrementStatistics, ServiceError> {
        let dossiers = self.repository.list_dossiers()?;
        Ok(RecouvrementStatistics::from_dossiers(&dossiers))
    }

    fn fetch(&self, id: DossierId) -> Result<DossierRecouvrement, ServiceError> {
        self.repository
            .fetch_dossier(id)?
            .ok_or_else(|| ServiceError::not_found("dossier", id.0))
    }
}

fn new_creance(request: NewCreance) -> Creance {
    Creance {
        id: CreanceId(CREANCE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
        libelle: request.libelle.trim().to_string(),
        montant: request.montant.round_dp(2),
        date_echeance: request.date_echeance,
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
