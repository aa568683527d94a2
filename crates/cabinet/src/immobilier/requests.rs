use super::domain::{ImmeubleId, LocataireId, LotId, LotStatut, LotType};
use super::periode::Periode;
use crate::web::{FieldErrors, Validate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_JOUR_ECHEANCE: u8 = 5;
const MAX_JOUR_ECHEANCE: u8 = 28;

#[derive(Debug, Clone, Deserialize)]
pub struct NewImmeuble {
    pub nom: String,
    pub adresse: String,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub proprietaire: Option<String>,
}

impl Validate for NewImmeuble {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("nom", &self.nom);
        errors.require_text("adresse", &self.adresse);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLot {
    pub immeuble_id: ImmeubleId,
    pub numero: String,
    pub type_lot: LotType,
    #[serde(default)]
    pub etage: Option<i32>,
    #[serde(default)]
    pub superficie: Option<Decimal>,
    pub loyer_mensuel: Decimal,
    #[serde(default)]
    pub statut: Option<LotStatut>,
}

impl Validate for NewLot {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("numero", &self.numero);
        errors.require_non_negative("loyer_mensuel", self.loyer_mensuel);
        if let Some(superficie) = self.superficie {
            errors.require_positive("superficie", superficie);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLocataire {
    pub nom: String,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Validate for NewLocataire {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("nom", &self.nom);
        if let Some(email) = self.email.as_deref().map(str::trim) {
            if !email.is_empty() && !looks_like_email(email) {
                errors.add("email", format!("'{email}' is not a valid email address"));
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBail {
    pub locataire_id: LocataireId,
    pub lot_id: LotId,
    /// Defaults to the lot's monthly rent.
    #[serde(default)]
    pub montant_loyer: Option<Decimal>,
    #[serde(default)]
    pub jour_echeance: Option<u8>,
    pub date_debut: NaiveDate,
    #[serde(default)]
    pub date_fin: Option<NaiveDate>,
}

impl Validate for NewBail {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(montant) = self.montant_loyer {
            errors.require_positive("montant_loyer", montant);
        }
        if let Some(jour) = self.jour_echeance {
            if !(1..=MAX_JOUR_ECHEANCE).contains(&jour) {
                errors.add(
                    "jour_echeance",
                    format!("jour_echeance must be between 1 and {MAX_JOUR_ECHEANCE}"),
                );
            }
        }
        if let Some(fin) = self.date_fin {
            if fin < self.date_debut {
                errors.add("date_fin", "date_fin must not be before date_debut");
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResiliationBail {
    pub date_fin: NaiveDate,
}

impl Validate for ResiliationBail {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEncaissement {
    pub lot_id: LotId,
    pub periode: Periode,
    pub montant: Decimal,
    pub date_encaissement: NaiveDate,
    #[serde(default)]
    pub mode_paiement: Option<String>,
}

impl Validate for NewEncaissement {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_positive("montant", self.montant);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepense {
    pub immeuble_id: ImmeubleId,
    pub libelle: String,
    pub montant: Decimal,
    pub date_depense: NaiveDate,
}

impl Validate for NewDepense {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("libelle", &self.libelle);
        errors.require_positive("montant", self.montant);
        errors.into_result()
    }
}

/// `?periode=YYYY-MM`; the current month when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodeQuery {
    #[serde(default)]
    pub periode: Option<Periode>,
}

/// Query string of `GET /api/immobilier/lots`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LotFilter {
    #[serde(default)]
    pub immeuble_id: Option<ImmeubleId>,
    #[serde(default)]
    pub statut: Option<LotStatut>,
}

impl LotFilter {
    pub(crate) fn matches(&self, immeuble_id: ImmeubleId, statut: LotStatut) -> bool {
        self.immeuble_id.map_or(true, |id| id == immeuble_id)
            && self.statut.map_or(true, |wanted| wanted == statut)
    }
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
