use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::dashboard::{ImmeubleBilan, ImmobilierDashboard, OccupancyStatistics};
use super::domain::{
    Bail, BailId, DepenseId, DepenseImmeuble, EncaissementId, EncaissementLoyer, Immeuble,
    ImmeubleId, Locataire, LocataireId, Lot, LotId, LotStatut,
};
use super::loyers::{InactiveLeasePolicy, RentCollectionStatistics};
use super::periode::Periode;
use super::repository::ImmobilierRepository;
use super::requests::{
    LotFilter, NewBail, NewDepense, NewEncaissement, NewImmeuble, NewLocataire, NewLot,
    ResiliationBail, DEFAULT_JOUR_ECHEANCE,
};
use crate::error::ServiceError;
use crate::web::{FieldErrors, Validate};

static IMMEUBLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static LOT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static LOCATAIRE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static BAIL_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ENCAISSEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DEPENSE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Building, lease and rent-ledger operations.
pub struct ImmobilierService<R> {
    repository: Arc<R>,
    policy: InactiveLeasePolicy,
}

impl<R> ImmobilierService<R>
where
    R: ImmobilierRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: InactiveLeasePolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> InactiveLeasePolicy {
        self.policy
    }

    pub fn create_immeuble(&self, request: NewImmeuble) -> Result<Immeuble, ServiceError> {
        request.validate()?;
        let nom = request.nom.trim().to_string();
        if self.find_immeuble_by_nom(&nom)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "immeuble named {nom} already exists"
            )));
        }

        let immeuble = Immeuble {
            id: ImmeubleId(IMMEUBLE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            nom,
            adresse: request.adresse.trim().to_string(),
            ville: clean(request.ville),
            proprietaire: clean(request.proprietaire),
        };
        let stored = self.repository.insert_immeuble(immeuble)?;
        info!(immeuble_id = stored.id.0, nom = %stored.nom, "immeuble created");
        Ok(stored)
    }

    pub fn get_immeuble(&self, id: ImmeubleId) -> Result<Immeuble, ServiceError> {
        self.repository
            .fetch_immeuble(id)?
            .ok_or_else(|| ServiceError::not_found("immeuble", id.0))
    }

    pub fn list_immeubles(&self) -> Result<Vec<Immeuble>, ServiceError> {
        let mut immeubles = self.repository.list_immeubles()?;
        immeubles.sort_by_key(|immeuble| immeuble.id);
        Ok(immeubles)
    }

    /// Case-insensitive lookup on the trimmed name.
    pub fn find_immeuble_by_nom(&self, nom: &str) -> Result<Option<Immeuble>, ServiceError> {
        let wanted = nom.trim().to_lowercase();
        Ok(self
            .repository
            .list_immeubles()?
            .into_iter()
            .find(|immeuble| immeuble.nom.to_lowercase() == wanted))
    }

    pub fn create_lot(&self, request: NewLot) -> Result<Lot, ServiceError> {
        request.validate()?;
        let immeuble = self.get_immeuble(request.immeuble_id)?;
        let numero = request.numero.trim().to_string();
        let duplicate = self.repository.list_lots()?.into_iter().any(|lot| {
            lot.immeuble_id == immeuble.id && lot.numero.eq_ignore_ascii_case(&numero)
        });
        if duplicate {
            return Err(ServiceError::Conflict(format!(
                "lot {numero} already exists in immeuble {}",
                immeuble.nom
            )));
        }

        let lot = Lot {
            id: LotId(LOT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            immeuble_id: immeuble.id,
            numero,
            type_lot: request.type_lot,
            etage: request.etage,
            superficie: request.superficie,
            loyer_mensuel: request.loyer_mensuel.round_dp(2),
            statut: request.statut.unwrap_or(LotStatut::Libre),
        };
        let stored = self.repository.insert_lot(lot)?;
        info!(lot_id = stored.id.0, immeuble_id = immeuble.id.0, "lot created");
        Ok(stored)
    }

    pub fn get_lot(&self, id: LotId) -> Result<Lot, ServiceError> {
        self.repository
            .fetch_lot(id)?
            .ok_or_else(|| ServiceError::not_found("lot", id.0))
    }

    pub fn list_lots(&self, filter: &LotFilter) -> Result<Vec<Lot>, ServiceError> {
        let mut lots = self
            .repository
            .list_lots()?
            .into_iter()
            .filter(|lot| filter.matches(lot.immeuble_id, lot.statut))
            .collect::<Vec<_>>();
        lots.sort_by(|a, b| {
            a.immeuble_id
                .cmp(&b.immeuble_id)
                .then_with(|| a.numero.cmp(&b.numero))
        });
        Ok(lots)
    }

    pub fn create_locataire(&self, request: NewLocataire) -> Result<Locataire, ServiceError> {
        request.validate()?;
        let locataire = Locataire {
            id: LocataireId(LOCATAIRE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            nom: request.nom.trim().to_string(),
            prenom: clean(request.prenom),
            telephone: clean(request.telephone),
            email: clean(request.email),
            lot_id: None,
        };
        let stored = self.repository.insert_locataire(locataire)?;
        info!(locataire_id = stored.id.0, "locataire created");
        Ok(stored)
    }

    pub fn get_locataire(&self, id: LocataireId) -> Result<Locataire, ServiceError> {
        self.repository
            .fetch_locataire(id)?
            .ok_or_else(|| ServiceError::not_found("locataire", id.0))
    }

    pub fn list_locataires(&self) -> Result<Vec<Locataire>, ServiceError> {
        let mut locataires = self.repository.list_locataires()?;
        locataires.sort_by_key(|locataire| locataire.id);
        Ok(locataires)
    }

    /// Sign a lease: the lot becomes OCCUPE and the tenant is attached to it.
    pub fn create_bail(&self, request: NewBail) -> Result<Bail, ServiceError> {
        request.validate()?;
        let mut locataire = self.get_locataire(request.locataire_id)?;
        let mut lot = self.get_lot(request.lot_id)?;

        if lot.statut == LotStatut::Maintenance {
            return Err(ServiceError::Rule(format!(
                "lot {} is {} and cannot be leased",
                lot.numero,
                lot.statut.label()
            )));
        }
        if self.active_bail_for_lot(lot.id)?.is_some() {
            return Err(ServiceError::Rule(format!(
                "lot {} already has an active bail",
                lot.numero
            )));
        }
        if let Some(current) = locataire.lot_id {
            return Err(ServiceError::Rule(format!(
                "locataire {} already occupies lot {}",
                locataire.id.0, current.0
            )));
        }

        let bail = Bail {
            id: BailId(BAIL_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            locataire_id: locataire.id,
            lot_id: lot.id,
            montant_loyer: request
                .montant_loyer
                .unwrap_or(lot.loyer_mensuel)
                .round_dp(2),
            jour_echeance: request.jour_echeance.unwrap_or(DEFAULT_JOUR_ECHEANCE),
            date_debut: request.date_debut,
            date_fin: request.date_fin,
            actif: true,
        };
        let stored = self.repository.insert_bail(bail)?;

        lot.statut = LotStatut::Occupe;
        self.repository.update_lot(lot)?;
        locataire.lot_id = Some(stored.lot_id);
        self.repository.update_locataire(locataire)?;

        info!(
            bail_id = stored.id.0,
            lot_id = stored.lot_id.0,
            locataire_id = stored.locataire_id.0,
            "bail signed"
        );
        Ok(stored)
    }

    pub fn get_bail(&self, id: BailId) -> Result<Bail, ServiceError> {
        self.repository
            .fetch_bail(id)?
            .ok_or_else(|| ServiceError::not_found("bail", id.0))
    }

    pub fn list_baux(&self) -> Result<Vec<Bail>, ServiceError> {
        let mut baux = self.repository.list_baux()?;
        baux.sort_by_key(|bail| bail.id);
        Ok(baux)
    }

    /// End a lease: the lot is released and the tenant detached.
    pub fn resilier_bail(
        &self,
        id: BailId,
        request: ResiliationBail,
    ) -> Result<Bail, ServiceError> {
        request.validate()?;
        let mut bail = self.get_bail(id)?;
        if !bail.actif {
            return Err(ServiceError::Rule(format!("bail {} is already ended", id.0)));
        }
        if request.date_fin < bail.date_debut {
            return Err(FieldErrors::single(
                "date_fin",
                format!("date_fin must not be before date_debut {}", bail.date_debut),
            )
            .into());
        }

        bail.actif = false;
        bail.date_fin = Some(request.date_fin);
        self.repository.update_bail(bail.clone())?;

        match self.repository.fetch_lot(bail.lot_id)? {
            Some(mut lot) => {
                lot.statut = LotStatut::Libre;
                self.repository.update_lot(lot)?;
            }
            None => warn!(bail_id = id.0, lot_id = bail.lot_id.0, "leased lot missing"),
        }
        if let Some(mut locataire) = self.repository.fetch_locataire(bail.locataire_id)? {
            if locataire.lot_id == Some(bail.lot_id) {
                locataire.lot_id = None;
                self.repository.update_locataire(locataire)?;
            }
        }

        info!(bail_id = id.0, date_fin = %request.date_fin, "bail ended");
        Ok(bail)
    }

    pub fn record_encaissement(
        &self,
        request: NewEncaissement,
    ) -> Result<EncaissementLoyer, ServiceError> {
        request.validate()?;
        let lot = self.get_lot(request.lot_id)?;
        let encaissement = EncaissementLoyer {
            id: EncaissementId(ENCAISSEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            lot_id: lot.id,
            periode: request.periode,
            montant: request.montant.round_dp(2),
            date_encaissement: request.date_encaissement,
            mode_paiement: clean(request.mode_paiement),
        };
        let stored = self.repository.insert_encaissement(encaissement)?;
        info!(
            encaissement_id = stored.id.0,
            lot_id = lot.id.0,
            periode = %stored.periode,
            montant = %stored.montant,
            "rent payment recorded"
        );
        Ok(stored)
    }

    pub fn list_encaissements(
        &self,
        periode: Option<Periode>,
    ) -> Result<Vec<EncaissementLoyer>, ServiceError> {
        let mut encaissements = self
            .repository
            .list_encaissements()?
            .into_iter()
            .filter(|encaissement| periode.map_or(true, |wanted| encaissement.periode == wanted))
            .collect::<Vec<_>>();
        encaissements.sort_by_key(|encaissement| (encaissement.date_encaissement, encaissement.id));
        Ok(encaissements)
    }

    pub fn record_depense(&self, request: NewDepense) -> Result<DepenseImmeuble, ServiceError> {
        request.validate()?;
        let immeuble = self.get_immeuble(request.immeuble_id)?;
        let depense = DepenseImmeuble {
            id: DepenseId(DEPENSE_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            immeuble_id: immeuble.id,
            libelle: request.libelle.trim().to_string(),
            montant: request.montant.round_dp(2),
            date_depense: request.date_depense,
        };
        let stored = self.repository.insert_depense(depense)?;
        info!(depense_id = stored.id.0, immeuble_id = immeuble.id.0, "expense recorded");
        Ok(stored)
    }

    pub fn list_depenses(
        &self,
        periode: Option<Periode>,
    ) -> Result<Vec<DepenseImmeuble>, ServiceError> {
        let mut depenses = self
            .repository
            .list_depenses()?
            .into_iter()
            .filter(|depense| periode.map_or(true, |wanted| wanted.contains(depense.date_depense)))
            .collect::<Vec<_>>();
        depenses.sort_by_key(|depense| (depense.date_depense, depense.id));
        Ok(depenses)
    }

    pub fn impayes(&self, periode: Periode) -> Result<RentCollectionStatistics, ServiceError> {
        let baux = self.repository.list_baux()?;
        let encaissements = self.repository.list_encaissements()?;
        Ok(RentCollectionStatistics::compute(
            periode,
            &baux,
            &encaissements,
            self.policy,
        ))
    }

    pub fn dashboard(&self, periode: Periode) -> Result<ImmobilierDashboard, ServiceError> {
        let lots = self.repository.list_lots()?;
        let occupation = OccupancyStatistics::from_lots(&lots);
        let loyers = self.impayes(periode)?;
        Ok(ImmobilierDashboard::new(
            self.repository.list_immeubles()?.len(),
            self.repository.list_locataires()?.len(),
            occupation,
            loyers,
        ))
    }

    pub fn bilan(
        &self,
        immeuble_id: ImmeubleId,
        periode: Periode,
    ) -> Result<ImmeubleBilan, ServiceError> {
        let immeuble = self.get_immeuble(immeuble_id)?;
        let lots = self.repository.list_lots()?;
        let encaissements = self.repository.list_encaissements()?;
        let depenses = self.repository.list_depenses()?;
        Ok(ImmeubleBilan::compute(
            &immeuble,
            periode,
            &lots,
            &encaissements,
            &depenses,
        ))
    }

    fn active_bail_for_lot(&self, lot_id: LotId) -> Result<Option<Bail>, ServiceError> {
        Ok(self
            .repository
            .list_baux()?
            .into_iter()
            .find(|bail| bail.lot_id == lot_id && bail.actif))
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
