//! Legal case tracking: affaires, audiences, hearing outcomes, enrolment
//! reminders and hearing statistics.

pub mod domain;
pub mod repository;
pub mod requests;
pub mod router;
pub mod service;
pub mod stats;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    Affaire, AffaireId, AffaireStatut, Audience, AudienceId, AudienceStatut, ResultatAudience,
    ResultatId, TypeAudience, TypeResultat,
};
pub use repository::ContentieuxRepository;
pub use requests::{AudienceFilter, NewAffaire, NewAudience, NewResultat, UpdateAffaireStatut};
pub use router::contentieux_router;
pub use service::{ContentieuxService, ResultatOutcome};
pub use stats::AudienceStatistics;
pub use status::{derive_statut, due_reminders, pending_enrolment_reminders};
