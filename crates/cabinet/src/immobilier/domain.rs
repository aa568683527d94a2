use super::periode::Periode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);
    };
}

entity_id!(
    /// Identifier wrapper for buildings.
    ImmeubleId
);
entity_id!(
    /// Identifier wrapper for rentable units.
    LotId
);
entity_id!(
    /// Identifier wrapper for tenants.
    LocataireId
);
entity_id!(
    /// Identifier wrapper for leases.
    BailId
);
entity_id!(EncaissementId);
entity_id!(DepenseId);

/// A managed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Immeuble {
    pub id: ImmeubleId,
    pub nom: String,
    pub adresse: String,
    pub ville: Option<String>,
    pub proprietaire: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotType {
    Studio,
    F1,
    F2,
    F3,
    F4,
    F5,
    Magasin,
    Bureau,
    Autre,
}

impl LotType {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Studio,
            Self::F1,
            Self::F2,
            Self::F3,
            Self::F4,
            Self::F5,
            Self::Magasin,
            Self::Bureau,
            Self::Autre,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Studio => "STUDIO",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::Magasin => "MAGASIN",
            Self::Bureau => "BUREAU",
            Self::Autre => "AUTRE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Self::ordered().into_iter().find(|kind| kind.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatut {
    Libre,
    Occupe,
    Maintenance,
}

impl LotStatut {
    pub const fn ordered() -> [Self; 3] {
        [Self::Libre, Self::Occupe, Self::Maintenance]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Libre => "LIBRE",
            Self::Occupe => "OCCUPE",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Libre => "Libre",
            Self::Occupe => "Occupé",
            Self::Maintenance => "En maintenance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Self::ordered().into_iter().find(|statut| statut.code() == code)
    }
}

/// A rentable unit inside an [`Immeuble`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub immeuble_id: ImmeubleId,
    pub numero: String,
    pub type_lot: LotType,
    pub etage: Option<i32>,
    pub superficie: Option<Decimal>,
    pub loyer_mensuel: Decimal,
    pub statut: LotStatut,
}

/// A tenant, attached to at most one lot at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locataire {
    pub id: LocataireId,
    pub nom: String,
    pub prenom: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub lot_id: Option<LotId>,
}

/// Lease linking a tenant to a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bail {
    pub id: BailId,
    pub locataire_id: LocataireId,
    pub lot_id: LotId,
    pub montant_loyer: Decimal,
    /// Day of month the rent falls due.
    pub jour_echeance: u8,
    pub date_debut: NaiveDate,
    pub date_fin: Option<NaiveDate>,
    pub actif: bool,
}

impl Bail {
    /// Due date of the rent for `periode`.
    pub fn echeance(&self, periode: Periode) -> NaiveDate {
        periode.day(u32::from(self.jour_echeance))
    }
}

/// Rent payment for a lot and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncaissementLoyer {
    pub id: EncaissementId,
    pub lot_id: LotId,
    pub periode: Periode,
    pub montant: Decimal,
    pub date_encaissement: NaiveDate,
    pub mode_paiement: Option<String>,
}

/// Expense booked against a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepenseImmeuble {
    pub id: DepenseId,
    pub immeuble_id: ImmeubleId,
    pub libelle: String,
    pub montant: Decimal,
    pub date_depense: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lot_type_parsing_is_case_insensitive() {
        assert_eq!(LotType::parse(" studio "), Some(LotType::Studio));
        assert_eq!(LotType::parse("f3"), Some(LotType::F3));
        assert_eq!(LotType::parse("INVALID"), None);
    }

    #[test]
    fn lot_type_serializes_as_code() {
        for kind in LotType::ordered() {
            let json = serde_json::to_value(kind).expect("serializes");
            assert_eq!(json, kind.code());
        }
    }

    #[test]
    fn lot_statut_serializes_as_code() {
        for statut in LotStatut::ordered() {
            let json = serde_json::to_value(statut).expect("serializes");
            assert_eq!(json, statut.code());
        }
    }

    #[test]
    fn echeance_is_clamped_to_month() {
        let bail = Bail {
            id: BailId(1),
            locataire_id: LocataireId(1),
            lot_id: LotId(1),
            montant_loyer: Decimal::new(45000, 2),
            jour_echeance: 5,
            date_debut: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            date_fin: None,
            actif: true,
        };
        let periode: Periode = "2025-02".parse().expect("valid periode");
        assert_eq!(
            bail.echeance(periode),
            NaiveDate::from_ymd_opt(2025, 2, 5).expect("valid date")
        );
    }
}
