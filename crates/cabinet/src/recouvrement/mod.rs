//! Debt recovery: dossiers, itemised claims and payments received.

pub mod domain;
pub mod repository;
pub mod requests;
pub mod router;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    Creance, CreanceId, DossierId, DossierRecouvrement, DossierStatut, DossierSummary,
    PaiementId, PaiementRecouvrement,
};
pub use repository::RecouvrementRepository;
pub use requests::{NewCreance, NewDossier, NewPaiement};
pub use router::recouvrement_router;
pub use service::RecouvrementService;
pub use stats::RecouvrementStatistics;
