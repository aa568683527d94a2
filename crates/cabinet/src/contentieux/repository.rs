use super::domain::{Affaire, AffaireId, Audience, AudienceId};
use crate::store::RepositoryError;

/// Storage abstraction for cases and hearings.
pub trait ContentieuxRepository: Send + Sync {
    fn insert_affaire(&self, affaire: Affaire) -> Result<Affaire, RepositoryError>;
    fn update_affaire(&self, affaire: Affaire) -> Result<(), RepositoryError>;
    fn fetch_affaire(&self, id: AffaireId) -> Result<Option<Affaire>, RepositoryError>;
    fn find_affaire_by_reference(&self, reference: &str)
        -> Result<Option<Affaire>, RepositoryError>;
    fn list_affaires(&self) -> Result<Vec<Affaire>, RepositoryError>;

    fn insert_audience(&self, audience: Audience) -> Result<Audience, RepositoryError>;
    /// Edit the stored hearing in place. `change` runs against the current
    /// record while the store is locked and its edits are kept only when it
    /// succeeds. `Ok(None)` when the hearing does not exist. `change` must
    /// not call back into the repository.
    fn modify_audience<T, E, F>(&self, id: AudienceId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut Audience) -> Result<T, E>,
        E: From<RepositoryError>;
    fn fetch_audience(&self, id: AudienceId) -> Result<Option<Audience>, RepositoryError>;
    fn list_audiences(&self) -> Result<Vec<Audience>, RepositoryError>;
    fn delete_audience(&self, id: AudienceId) -> Result<(), RepositoryError>;
}
