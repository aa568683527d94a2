use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{DossierRecouvrement, DossierStatut};

/// Portfolio-wide recovery figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecouvrementStatistics {
    pub nb_dossiers: usize,
    pub nb_soldes: usize,
    pub total_a_recouvrer: Decimal,
    pub total_paiements: Decimal,
    pub solde_restant: Decimal,
    /// Recovered share of the amounts owed, as a percentage.
    pub taux_recouvrement: Decimal,
}

impl RecouvrementStatistics {
    pub fn from_dossiers<'a, I>(dossiers: I) -> Self
    where
        I: IntoIterator<Item = &'a DossierRecouvrement>,
    {
        let mut stats = Self {
            nb_dossiers: 0,
            nb_soldes: 0,
            total_a_recouvrer: Decimal::ZERO,
            total_paiements: Decimal::ZERO,
            solde_restant: Decimal::ZERO,
            taux_recouvrement: Decimal::ZERO,
        };
        for dossier in dossiers {
            stats.nb_dossiers += 1;
            if dossier.statut() == DossierStatut::Solde {
                stats.nb_soldes += 1;
            }
            stats.total_a_recouvrer += dossier.total_a_recouvrer();
            stats.total_paiements += dossier.total_paiements();
        }
        stats.solde_restant = stats.total_a_recouvrer - stats.total_paiements;
        if !stats.total_a_recouvrer.is_zero() {
            stats.taux_recouvrement = (stats.total_paiements * Decimal::ONE_HUNDRED
                / stats.total_a_recouvrer)
                .round_dp(2);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recouvrement::domain::{
        Creance, CreanceId, DossierId, PaiementId, PaiementRecouvrement,
    };
    use chrono::NaiveDate;

    fn dossier(id: u64, owed: i64, paid: i64) -> DossierRecouvrement {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        DossierRecouvrement {
            id: DossierId(id),
            reference: format!("REC-{id}"),
            creancier: "Banque Atlantique".to_string(),
            debiteur: format!("Débiteur {id}"),
            created_at: day.and_hms_opt(10, 0, 0).expect("valid time"),
            creances: vec![Creance {
                id: CreanceId(id),
                libelle: "Principal".to_string(),
                montant: Decimal::from(owed),
                date_echeance: Some(day),
            }],
            paiements: (paid > 0)
                .then(|| PaiementRecouvrement {
                    id: PaiementId(id),
                    montant: Decimal::from(paid),
                    date_paiement: day,
                    mode_paiement: Some("CHEQUE".to_string()),
                    reference: None,
                })
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn totals_keep_balance_identity() {
        let dossiers = vec![dossier(1, 1000, 250), dossier(2, 600, 600), dossier(3, 400, 0)];
        let stats = RecouvrementStatistics::from_dossiers(&dossiers);

        assert_eq!(stats.nb_dossiers, 3);
        assert_eq!(stats.nb_soldes, 1);
        assert_eq!(stats.total_a_recouvrer, Decimal::from(2000));
        assert_eq!(stats.total_paiements, Decimal::from(850));
        assert_eq!(
            stats.total_a_recouvrer - stats.total_paiements,
            stats.solde_restant
        );
        assert_eq!(stats.taux_recouvrement, Decimal::new(4250, 2));
    }

    #[test]
    fn empty_portfolio_has_zero_rate() {
        let stats = RecouvrementStatistics::from_dossiers(&Vec::<DossierRecouvrement>::new());
        assert_eq!(stats.nb_dossiers, 0);
        assert_eq!(stats.taux_recouvrement, Decimal::ZERO);
    }
}
