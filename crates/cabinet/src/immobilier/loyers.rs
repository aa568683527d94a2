//! Rent collection for a period: expected amounts, collected amounts and
//! unpaid remainders (impayés).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{Bail, BailId, EncaissementLoyer, LocataireId, LotId};
use super::periode::Periode;

/// How a lease that ended partway through a period is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveLeasePolicy {
    /// Expected for the period it ended in, excluded afterwards.
    #[default]
    IncludeEndingPeriod,
    /// Excluded from the period it ended in as well.
    ExcludeEndingPeriod,
}

impl InactiveLeasePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "include_ending_period" | "include" => Some(Self::IncludeEndingPeriod),
            "exclude_ending_period" | "exclude" => Some(Self::ExcludeEndingPeriod),
            _ => None,
        }
    }

    /// Whether `bail` owes rent for `periode`.
    pub fn expects_rent(self, bail: &Bail, periode: Periode) -> bool {
        if bail.date_debut > periode.last_day() {
            return false;
        }

        match bail.date_fin {
            None => bail.actif,
            Some(fin) if fin < periode.first_day() => false,
            Some(fin) if fin < periode.last_day() => {
                matches!(self, Self::IncludeEndingPeriod)
            }
            Some(_) => true,
        }
    }
}

/// One lease's position for the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpayeLine {
    pub bail_id: BailId,
    pub lot_id: LotId,
    pub locataire_id: LocataireId,
    pub attendu: Decimal,
    pub paye: Decimal,
    pub reste: Decimal,
}

/// Aggregate rent position for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentCollectionStatistics {
    pub periode: Periode,
    pub total_attendu: Decimal,
    pub total_payes: Decimal,
    pub total_impayes: Decimal,
    pub nb_impayes: usize,
    /// Leases with a positive remainder, largest first.
    pub impayes: Vec<ImpayeLine>,
}

impl RentCollectionStatistics {
    /// Match the period's payments to the leases expected to pay.
    ///
    /// Payments are pooled per lot and poured into that lot's expected
    /// leases in start-date order; the last lease absorbs any overpayment.
    /// A lease with nothing collected owes its full amount.
    pub fn compute(
        periode: Periode,
        baux: &[Bail],
        encaissements: &[EncaissementLoyer],
        policy: InactiveLeasePolicy,
    ) -> Self {
        let mut leases_by_lot: BTreeMap<LotId, Vec<&Bail>> = BTreeMap::new();
        for bail in baux.iter().filter(|bail| policy.expects_rent(bail, periode)) {
            leases_by_lot.entry(bail.lot_id).or_default().push(bail);
        }

        let mut collected_by_lot: BTreeMap<LotId, Decimal> = BTreeMap::new();
        for encaissement in encaissements
            .iter()
            .filter(|encaissement| encaissement.periode == periode)
        {
            *collected_by_lot.entry(encaissement.lot_id).or_default() += encaissement.montant;
        }

        let mut total_attendu = Decimal::ZERO;
        let mut total_payes = Decimal::ZERO;
        let mut total_impayes = Decimal::ZERO;
        let mut impayes = Vec::new();

        for (lot_id, mut leases) in leases_by_lot {
            leases.sort_by_key(|bail| (bail.date_debut, bail.id));
            let mut remaining = collected_by_lot.get(&lot_id).copied().unwrap_or_default();
            total_payes += remaining;

            let last_index = leases.len() - 1;
            for (index, bail) in leases.into_iter().enumerate() {
                let attendu = bail.montant_loyer;
                let paye = if index == last_index {
                    remaining
                } else {
                    remaining.min(attendu)
                };
                remaining -= paye;

                total_attendu += attendu;
                // Lines are rounded like the totals and sum to total_impayes.
                let reste = (attendu - paye).round_dp(2);
                if reste > Decimal::ZERO {
                    total_impayes += reste;
                    impayes.push(ImpayeLine {
                        bail_id: bail.id,
                        lot_id,
                        locataire_id: bail.locataire_id,
                        attendu: attendu.round_dp(2),
                        paye: paye.round_dp(2),
                        reste,
                    });
                }
            }
        }

        impayes.sort_by(|a, b| b.reste.cmp(&a.reste).then(a.bail_id.cmp(&b.bail_id)));

        Self {
            periode,
            total_attendu: total_attendu.round_dp(2),
            total_payes: total_payes.round_dp(2),
            total_impayes: total_impayes.round_dp(2),
            nb_impayes: impayes.len(),
            impayes,
        }
    }
}
