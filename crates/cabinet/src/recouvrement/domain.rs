use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DossierId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreanceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaiementId(pub u64);

/// An amount owed under a dossier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creance {
    pub id: CreanceId,
    pub libelle: String,
    pub montant: Decimal,
    pub date_echeance: Option<NaiveDate>,
}

/// A payment received from the debtor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaiementRecouvrement {
    pub id: PaiementId,
    pub montant: Decimal,
    pub date_paiement: NaiveDate,
    pub mode_paiement: Option<String>,
    pub reference: Option<String>,
}

/// Debt-recovery file: what a debtor owes a creditor and what was paid back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierRecouvrement {
    pub id: DossierId,
    pub reference: String,
    pub creancier: String,
    pub debiteur: String,
    pub created_at: NaiveDateTime,
    pub creances: Vec<Creance>,
    pub paiements: Vec<PaiementRecouvrement>,
}

impl DossierRecouvrement {
    pub fn total_a_recouvrer(&self) -> Decimal {
        self.creances
            .iter()
            .map(|creance| creance.montant)
            .sum::<Decimal>()
            .round_dp(2)
    }

    pub fn total_paiements(&self) -> Decimal {
        self.paiements
            .iter()
            .map(|paiement| paiement.montant)
            .sum::<Decimal>()
            .round_dp(2)
    }

    /// Always `total_a_recouvrer - total_paiements`, both already rounded.
    pub fn solde_restant(&self) -> Decimal {
        self.total_a_recouvrer() - self.total_paiements()
    }

    pub fn statut(&self) -> DossierStatut {
        if self.creances.is_empty() {
            DossierStatut::Ouvert
        } else if self.solde_restant() <= Decimal::ZERO {
            DossierStatut::Solde
        } else {
            DossierStatut::EnCours
        }
    }
}

/// Derived from the amounts, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DossierStatut {
    /// No claim recorded yet.
    Ouvert,
    EnCours,
    Solde,
}

/// Dossier as returned over HTTP, with its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DossierSummary {
    #[serde(flatten)]
    pub dossier: DossierRecouvrement,
    pub statut: DossierStatut,
    pub total_a_recouvrer: Decimal,
    pub total_paiements: Decimal,
    pub solde_restant: Decimal,
}

impl From<DossierRecouvrement> for DossierSummary {
    fn from(dossier: DossierRecouvrement) -> Self {
        Self {
            statut: dossier.statut(),
            total_a_recouvrer: dossier.total_a_recouvrer(),
            total_paiements: dossier.total_paiements(),
            solde_restant: dossier.solde_restant(),
            dossier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("valid decimal")
    }

    fn dossier(creances: &[&str], paiements: &[&str]) -> DossierRecouvrement {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date");
        DossierRecouvrement {
            id: DossierId(1),
            reference: "REC-2025-001".to_string(),
            creancier: "SCI Horizon".to_string(),
            debiteur: "M. Kane".to_string(),
            created_at: day.and_hms_opt(9, 0, 0).expect("valid time"),
            creances: creances
                .iter()
                .enumerate()
                .map(|(index, raw)| Creance {
                    id: CreanceId(index as u64 + 1),
                    libelle: format!("Facture {index}"),
                    montant: amount(raw),
                    date_echeance: None,
                })
                .collect(),
            paiements: paiements
                .iter()
                .enumerate()
                .map(|(index, raw)| PaiementRecouvrement {
                    id: PaiementId(index as u64 + 1),
                    montant: amount(raw),
                    date_paiement: day,
                    mode_paiement: None,
                    reference: None,
                })
                .collect(),
        }
    }

    #[test]
    fn balance_is_difference_of_rounded_totals() {
        let dossier = dossier(&["1000.005", "250.10"], &["300.333", "0.01"]);

        assert_eq!(dossier.total_a_recouvrer(), amount("1250.10"));
        assert_eq!(dossier.total_paiements(), amount("300.34"));
        assert_eq!(
            dossier.total_a_recouvrer() - dossier.total_paiements(),
            dossier.solde_restant()
        );
        assert_eq!(dossier.statut(), DossierStatut::EnCours);
    }

    #[test]
    fn statut_follows_balance() {
        assert_eq!(dossier(&[], &[]).statut(), DossierStatut::Ouvert);
        assert_eq!(
            dossier(&["400"], &["150", "250"]).statut(),
            DossierStatut::Solde
        );
    }

    #[test]
    fn summary_serializes_totals_next_to_dossier_fields() {
        let summary = DossierSummary::from(dossier(&["100"], &["40"]));
        let json = serde_json::to_value(&summary).expect("serializes");

        assert_eq!(json["reference"], "REC-2025-001");
        assert_eq!(json["statut"], "EN_COURS");
        assert_eq!(json["solde_restant"], "60");
    }
}
