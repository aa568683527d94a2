use super::domain::{Audience, AudienceStatut};
use super::status::derive_statut;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Hearing counts per derived status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceStatistics {
    pub a_venir: usize,
    pub non_renseignees: usize,
    pub renseignees: usize,
    pub total: usize,
}

impl AudienceStatistics {
    pub fn from_audiences<'a, I>(audiences: I, now: NaiveDateTime) -> Self
    where
        I: IntoIterator<Item = &'a Audience>,
    {
        audiences
            .into_iter()
            .fold(Self::default(), |mut stats, audience| {
                stats.record(derive_statut(audience, now));
                stats
            })
    }

    fn record(&mut self, statut: AudienceStatut) {
        match statut {
            AudienceStatut::AVenir => self.a_venir += 1,
            AudienceStatut::PasseeNonRenseignee => self.non_renseignees += 1,
            AudienceStatut::Renseignee => self.renseignees += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, statut: AudienceStatut) -> usize {
        match statut {
            AudienceStatut::AVenir => self.a_venir,
            AudienceStatut::PasseeNonRenseignee => self.non_renseignees,
            AudienceStatut::Renseignee => self.renseignees,
        }
    }
}
