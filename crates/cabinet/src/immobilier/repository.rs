use super::domain::{
    Bail, BailId, DepenseImmeuble, EncaissementLoyer, Immeuble, ImmeubleId, Locataire,
    LocataireId, Lot, LotId,
};
use crate::store::RepositoryError;

/// Storage abstraction for buildings, units, tenants and rent ledgers.
pub trait ImmobilierRepository: Send + Sync {
    fn insert_immeuble(&self, immeuble: Immeuble) -> Result<Immeuble, RepositoryError>;
    fn fetch_immeuble(&self, id: ImmeubleId) -> Result<Option<Immeuble>, RepositoryError>;
    fn list_immeubles(&self) -> Result<Vec<Immeuble>, RepositoryError>;

    fn insert_lot(&self, lot: Lot) -> Result<Lot, RepositoryError>;
    fn update_lot(&self, lot: Lot) -> Result<(), RepositoryError>;
    fn fetch_lot(&self, id: LotId) -> Result<Option<Lot>, RepositoryError>;
    fn list_lots(&self) -> Result<Vec<Lot>, RepositoryError>;

    fn insert_locataire(&self, locataire: Locataire) -> Result<Locataire, RepositoryError>;
    fn update_locataire(&self, locataire: Locataire) -> Result<(), RepositoryError>;
    fn fetch_locataire(&self, id: LocataireId) -> Result<Option<Locataire>, RepositoryError>;
    fn list_locataires(&self) -> Result<Vec<Locataire>, RepositoryError>;

    fn insert_bail(&self, bail: Bail) -> Result<Bail, RepositoryError>;
    fn update_bail(&self, bail: Bail) -> Result<(), RepositoryError>;
    fn fetch_bail(&self, id: BailId) -> Result<Option<Bail>, RepositoryError>;
    fn list_baux(&self) -> Result<Vec<Bail>, RepositoryError>;

    fn insert_encaissement(
        &self,
        encaissement: EncaissementLoyer,
    ) -> Result<EncaissementLoyer, RepositoryError>;
    fn list_encaissements(&self) -> Result<Vec<EncaissementLoyer>, RepositoryError>;

    fn insert_depense(&self, depense: DepenseImmeuble) -> Result<DepenseImmeuble, RepositoryError>;
    fn list_depenses(&self) -> Result<Vec<DepenseImmeuble>, RepositoryError>;
}
