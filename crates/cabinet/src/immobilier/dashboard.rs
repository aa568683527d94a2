use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{DepenseImmeuble, EncaissementLoyer, Immeuble, ImmeubleId, Lot, LotStatut};
use super::loyers::RentCollectionStatistics;
use super::periode::Periode;

/// Lot counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyStatistics {
    pub total_lots: usize,
    pub libres: usize,
    pub occupes: usize,
    pub maintenance: usize,
    /// Occupied share of all lots, as a percentage with two decimals.
    pub taux_occupation: Decimal,
}

impl OccupancyStatistics {
    pub fn from_lots<'a, I>(lots: I) -> Self
    where
        I: IntoIterator<Item = &'a Lot>,
    {
        let mut stats = Self {
            total_lots: 0,
            libres: 0,
            occupes: 0,
            maintenance: 0,
            taux_occupation: Decimal::ZERO,
        };
        for lot in lots {
            stats.total_lots += 1;
            match lot.statut {
                LotStatut::Libre => stats.libres += 1,
                LotStatut::Occupe => stats.occupes += 1,
                LotStatut::Maintenance => stats.maintenance += 1,
            }
        }
        stats.taux_occupation = percentage(
            Decimal::from(stats.occupes as u64),
            Decimal::from(stats.total_lots as u64),
        );
        stats
    }
}

/// Portfolio overview for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmobilierDashboard {
    pub periode: Periode,
    pub nb_immeubles: usize,
    pub nb_locataires: usize,
    pub occupation: OccupancyStatistics,
    pub loyers: RentCollectionStatistics,
    /// Collected share of expected rent, as a percentage.
    pub taux_recouvrement: Decimal,
}

impl ImmobilierDashboard {
    pub fn new(
        nb_immeubles: usize,
        nb_locataires: usize,
        occupation: OccupancyStatistics,
        loyers: RentCollectionStatistics,
    ) -> Self {
        let taux_recouvrement = percentage(loyers.total_payes, loyers.total_attendu);
        Self {
            periode: loyers.periode,
            nb_immeubles,
            nb_locataires,
            occupation,
            loyers,
            taux_recouvrement,
        }
    }
}

/// Income and expenses of one building over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmeubleBilan {
    pub immeuble_id: ImmeubleId,
    pub nom: String,
    pub periode: Periode,
    pub loyers_encaisses: Decimal,
    pub depenses: Decimal,
    pub resultat: Decimal,
}

impl ImmeubleBilan {
    /// `lots` restricts which payments belong to the building; payments and
    /// expenses outside `periode` are ignored.
    pub fn compute(
        immeuble: &Immeuble,
        periode: Periode,
        lots: &[Lot],
        encaissements: &[EncaissementLoyer],
        depenses: &[DepenseImmeuble],
    ) -> Self {
        let loyers_encaisses: Decimal = encaissements
            .iter()
            .filter(|encaissement| encaissement.periode == periode)
            .filter(|encaissement| {
                lots.iter()
                    .any(|lot| lot.id == encaissement.lot_id && lot.immeuble_id == immeuble.id)
            })
            .map(|encaissement| encaissement.montant)
            .sum();
        let depenses: Decimal = depenses
            .iter()
            .filter(|depense| depense.immeuble_id == immeuble.id)
            .filter(|depense| periode.contains(depense.date_depense))
            .map(|depense| depense.montant)
            .sum();

        Self {
            immeuble_id: immeuble.id,
            nom: immeuble.nom.clone(),
            periode,
            loyers_encaisses: loyers_encaisses.round_dp(2),
            depenses: depenses.round_dp(2),
            resultat: (loyers_encaisses - depenses).round_dp(2),
        }
    }
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp(2)
}
