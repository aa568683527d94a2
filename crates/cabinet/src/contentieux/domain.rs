use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for legal cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffaireId(pub u64);

/// Identifier wrapper for hearings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudienceId(pub u64);

/// Identifier wrapper for hearing outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultatId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AffaireStatut {
    Active,
    Cloturee,
    Radiee,
}

impl AffaireStatut {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Cloturee => "Clôturée",
            Self::Radiee => "Radiée",
        }
    }

    /// Hearings may only be scheduled on open cases.
    pub const fn accepts_audiences(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A legal case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affaire {
    pub id: AffaireId,
    pub reference: String,
    pub intitule: String,
    pub statut: AffaireStatut,
    pub juridiction: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeAudience {
    MiseEnEtat,
    Plaidoirie,
    Refere,
    Delibere,
    Conciliation,
    Autre,
}

impl TypeAudience {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MiseEnEtat => "Mise en état",
            Self::Plaidoirie => "Plaidoirie",
            Self::Refere => "Référé",
            Self::Delibere => "Délibéré",
            Self::Conciliation => "Conciliation",
            Self::Autre => "Autre",
        }
    }
}

/// Hearing status. Only [`AudienceStatut::AVenir`] and
/// [`AudienceStatut::Renseignee`] are reachable by user action; the middle
/// state is derived from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudienceStatut {
    AVenir,
    PasseeNonRenseignee,
    Renseignee,
}

impl AudienceStatut {
    pub const fn ordered() -> [Self; 3] {
        [Self::AVenir, Self::PasseeNonRenseignee, Self::Renseignee]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AVenir => "À venir",
            Self::PasseeNonRenseignee => "Passée non renseignée",
            Self::Renseignee => "Renseignée",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A_VENIR" => Some(Self::AVenir),
            "PASSEE_NON_RENSEIGNEE" => Some(Self::PasseeNonRenseignee),
            "RENSEIGNEE" => Some(Self::Renseignee),
            _ => None,
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::AVenir => 0,
            Self::PasseeNonRenseignee => 1,
            Self::Renseignee => 2,
        }
    }

    /// True when moving from `self` to `next` never goes backwards.
    pub const fn can_advance_to(self, next: Self) -> bool {
        self.rank() <= next.rank()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeResultat {
    Renvoi,
    Delibere,
    Radiation,
    Jugement,
    Autre,
}

impl TypeResultat {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Renvoi => "Renvoi",
            Self::Delibere => "Mis en délibéré",
            Self::Radiation => "Radiation",
            Self::Jugement => "Jugement",
            Self::Autre => "Autre",
        }
    }
}

/// Outcome recorded for a hearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultatAudience {
    pub id: ResultatId,
    pub type_resultat: TypeResultat,
    pub nouvelle_date: Option<NaiveDate>,
    pub motif_renvoi: Option<String>,
    pub texte_delibere: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A scheduled court hearing. `statut` is a cache of
/// [`super::status::derive_statut`] and is refreshed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    pub id: AudienceId,
    pub affaire_id: AffaireId,
    pub date: NaiveDate,
    pub heure: Option<NaiveTime>,
    pub type_audience: TypeAudience,
    pub juridiction: Option<String>,
    pub salle: Option<String>,
    pub notes: Option<String>,
    pub statut: AudienceStatut,
    pub rappel_enrolement: bool,
    pub date_rappel_enrolement: Option<NaiveDate>,
    pub enrolement_effectue: bool,
    pub resultats: Vec<ResultatAudience>,
    /// Hearing that was adjourned (renvoi) into this one.
    pub audience_precedente: Option<AudienceId>,
}

impl Audience {
    /// Start of the hearing; midnight when no time was recorded.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.heure.unwrap_or(NaiveTime::MIN))
    }

    pub fn has_resultat(&self) -> bool {
        !self.resultats.is_empty()
    }

    pub fn reminder_pending(&self) -> bool {
        self.rappel_enrolement && !self.enrolement_effectue
    }

    /// Date the enrolment reminder fires; the hearing date when unset.
    pub fn reminder_date(&self) -> NaiveDate {
        self.date_rappel_enrolement.unwrap_or(self.date)
    }
}

