use super::domain::{AffaireId, AffaireStatut, AudienceStatut, TypeAudience, TypeResultat};
use crate::web::{FieldErrors, Validate};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};

const REFERENCE_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAffaire {
    pub reference: String,
    pub intitule: String,
    #[serde(default)]
    pub juridiction: Option<String>,
}

impl Validate for NewAffaire {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("reference", &self.reference);
        errors.require_text("intitule", &self.intitule);
        if self.reference.trim().chars().count() > REFERENCE_MAX_LEN {
            errors.add(
                "reference",
                format!("reference must not exceed {REFERENCE_MAX_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAffaireStatut {
    pub statut: AffaireStatut,
}

impl Validate for UpdateAffaireStatut {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAudience {
    pub affaire_id: AffaireId,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_heure")]
    pub heure: Option<NaiveTime>,
    pub type_audience: TypeAudience,
    #[serde(default)]
    pub juridiction: Option<String>,
    #[serde(default)]
    pub salle: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rappel_enrolement: bool,
    #[serde(default)]
    pub date_rappel_enrolement: Option<NaiveDate>,
}

impl Validate for NewAudience {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(reminder) = self.date_rappel_enrolement {
            if !self.rappel_enrolement {
                errors.add(
                    "date_rappel_enrolement",
                    "date_rappel_enrolement requires rappel_enrolement to be true",
                );
            }
            if reminder > self.date {
                errors.add(
                    "date_rappel_enrolement",
                    "date_rappel_enrolement must not be after the hearing date",
                );
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResultat {
    pub type_resultat: TypeResultat,
    #[serde(default)]
    pub nouvelle_date: Option<NaiveDate>,
    #[serde(default)]
    pub motif_renvoi: Option<String>,
    #[serde(default)]
    pub texte_delibere: Option<String>,
}

impl Validate for NewResultat {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        match self.type_resultat {
            TypeResultat::Renvoi => {
                if self.nouvelle_date.is_none() {
                    errors.add("nouvelle_date", "nouvelle_date is required for a RENVOI");
                }
            }
            TypeResultat::Delibere => {}
            _ => {
                if self.nouvelle_date.is_some() {
                    errors.add(
                        "nouvelle_date",
                        "nouvelle_date is only accepted for RENVOI or DELIBERE",
                    );
                }
            }
        }
        errors.into_result()
    }
}

/// Query string of `GET /api/contentieux/audiences`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudienceFilter {
    #[serde(default)]
    pub statut: Option<AudienceStatut>,
    #[serde(default)]
    pub affaire_id: Option<AffaireId>,
    #[serde(default)]
    pub du: Option<NaiveDate>,
    #[serde(default)]
    pub au: Option<NaiveDate>,
}

impl AudienceFilter {
    pub(crate) fn matches_schedule(&self, affaire_id: AffaireId, date: NaiveDate) -> bool {
        self.affaire_id.map_or(true, |id| id == affaire_id)
            && self.du.map_or(true, |du| date >= du)
            && self.au.map_or(true, |au| date <= au)
    }
}

/// Query string of `GET /api/contentieux/audiences/rappels`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub echeance: Option<NaiveDate>,
}

pub(crate) fn parse_heure(raw: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|err| format!("failed to parse '{raw}' as HH:MM ({err})"))
}

fn deserialize_optional_heure<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_heure(&value).map_err(serde::de::Error::custom))
        .transpose()
}
