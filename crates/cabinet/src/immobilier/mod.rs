//! Real-estate management: buildings, lots, tenants, leases, rent ledger,
//! unpaid-rent statistics and per-building results.

pub mod dashboard;
pub mod domain;
pub mod loyers;
pub mod periode;
pub mod repository;
pub mod requests;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use dashboard::{ImmeubleBilan, ImmobilierDashboard, OccupancyStatistics};
pub use domain::{
    Bail, BailId, DepenseId, DepenseImmeuble, EncaissementId, EncaissementLoyer, Immeuble,
    ImmeubleId, Locataire, LocataireId, Lot, LotId, LotStatut, LotType,
};
pub use loyers::{ImpayeLine, InactiveLeasePolicy, RentCollectionStatistics};
pub use periode::{Periode, PeriodeParseError};
pub use repository::ImmobilierRepository;
pub use requests::{
    LotFilter, NewBail, NewDepense, NewEncaissement, NewImmeuble, NewLocataire, NewLot,
    PeriodeQuery, ResiliationBail,
};
pub use router::immobilier_router;
pub use service::ImmobilierService;
