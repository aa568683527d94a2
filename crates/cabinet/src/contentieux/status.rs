use super::domain::{Audience, AudienceStatut};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

/// Status of a hearing as of `now`.
///
/// A recorded result always wins; otherwise a hearing whose start is strictly
/// before `now` is overdue for an outcome.
pub fn derive_statut(audience: &Audience, now: NaiveDateTime) -> AudienceStatut {
    if audience.has_resultat() {
        AudienceStatut::Renseignee
    } else if audience.scheduled_at() < now {
        AudienceStatut::PasseeNonRenseignee
    } else {
        AudienceStatut::AVenir
    }
}

/// Recompute the cached status. Returns `true` when the cache changed and the
/// record should be written back.
pub fn refresh_statut(audience: &mut Audience, now: NaiveDateTime) -> bool {
    let derived = derive_statut(audience, now);
    if audience.statut == derived {
        return false;
    }

    if !audience.statut.can_advance_to(derived) {
        warn!(
            audience_id = audience.id.0,
            cached = ?audience.statut,
            derived = ?derived,
            "persisted hearing status was ahead of the derived value"
        );
    }
    audience.statut = derived;
    true
}

/// Hearings still waiting for their enrolment, whatever their status,
/// ordered by reminder date then hearing date.
pub fn pending_enrolment_reminders<'a, I>(audiences: I) -> Vec<&'a Audience>
where
    I: IntoIterator<Item = &'a Audience>,
{
    let mut pending: Vec<&Audience> = audiences
        .into_iter()
        .filter(|audience| audience.reminder_pending())
        .collect();
    pending.sort_by_key(|audience| (audience.reminder_date(), audience.date, audience.id));
    pending
}

/// Pending reminders whose reminder date is on or before `today`.
pub fn due_reminders<'a, I>(audiences: I, today: NaiveDate) -> Vec<&'a Audience>
where
    I: IntoIterator<Item = &'a Audience>,
{
    pending_enrolment_reminders(audiences)
        .into_iter()
        .filter(|audience| audience.reminder_date() <= today)
        .collect()
}
