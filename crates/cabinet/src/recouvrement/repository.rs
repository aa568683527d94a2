use super::domain::{DossierId, DossierRecouvrement};
use crate::store::RepositoryError;

/// Storage abstraction for debt-recovery dossiers.
pub trait RecouvrementRepository: Send + Sync {
    fn insert_dossier(
        &self,
        dossier: DossierRecouvrement,
    ) -> Result<DossierRecouvrement, RepositoryError>;
    /// Same contract as [`crate::contentieux::ContentieuxRepository::modify_audience`].
    fn modify_dossier<T, E, F>(&self, id: DossierId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut DossierRecouvrement) -> Result<T, E>,
        E: From<RepositoryError>;
    fn fetch_dossier(&self, id: DossierId) -> Result<Option<DossierRecouvrement>, RepositoryError>;
    fn find_dossier_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError>;
    fn list_dossiers(&self) -> Result<Vec<DossierRecouvrement>, RepositoryError>;
}
