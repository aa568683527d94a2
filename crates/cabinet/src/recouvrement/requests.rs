use crate::web::{FieldErrors, Validate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewDossier {
    pub reference: String,
    pub creancier: String,
    pub debiteur: String,
    #[serde(default)]
    pub creances: Vec<NewCreance>,
}

impl Validate for NewDossier {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("reference", &self.reference);
        errors.require_text("creancier", &self.creancier);
        errors.require_text("debiteur", &self.debiteur);
        for (index, creance) in self.creances.iter().enumerate() {
            if let Err(nested) = creance.validate() {
                for (field, messages) in nested.iter() {
                    for message in messages {
                        errors.add(format!("creances[{index}].{field}"), message.clone());
                    }
                }
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCreance {
    pub libelle: String,
    pub montant: Decimal,
    #[serde(default)]
    pub date_echeance: Option<NaiveDate>,
}

impl Validate for NewCreance {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("libelle", &self.libelle);
        errors.require_positive("montant", self.montant);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPaiement {
    pub montant: Decimal,
    pub date_paiement: NaiveDate,
    #[serde(default)]
    pub mode_paiement: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl Validate for NewPaiement {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_positive("montant", self.montant);
        errors.into_result()
    }
}
