use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::RepositoryError;
use crate::contentieux::{Affaire, AffaireId, Audience, AudienceId, ContentieuxRepository};
use crate::immobilier::{
    Bail, BailId, DepenseId, DepenseImmeuble, EncaissementId, EncaissementLoyer, Immeuble,
    ImmeubleId, ImmobilierRepository, Locataire, LocataireId, Lot, LotId,
};
use crate::recouvrement::{DossierId, DossierRecouvrement, RecouvrementRepository};

#[derive(Default)]
struct Tables {
    affaires: BTreeMap<AffaireId, Affaire>,
    audiences: BTreeMap<AudienceId, Audience>,
    immeubles: BTreeMap<ImmeubleId, Immeuble>,
    lots: BTreeMap<LotId, Lot>,
    locataires: BTreeMap<LocataireId, Locataire>,
    baux: BTreeMap<BailId, Bail>,
    encaissements: BTreeMap<EncaissementId, EncaissementLoyer>,
    depenses: BTreeMap<DepenseId, DepenseImmeuble>,
    dossiers: BTreeMap<DossierId, DossierRecouvrement>,
}

/// Process-local store implementing every repository trait behind one lock,
/// so each single write is atomic.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn insert_new<K: Ord + Copy, V: Clone>(
    table: &mut BTreeMap<K, V>,
    key: K,
    value: V,
) -> Result<V, RepositoryError> {
    if table.contains_key(&key) {
        return Err(RepositoryError::Conflict);
    }
    table.insert(key, value.clone());
    Ok(value)
}

fn replace<K: Ord + Copy, V>(
    table: &mut BTreeMap<K, V>,
    key: K,
    value: V,
) -> Result<(), RepositoryError> {
    match table.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(RepositoryError::NotFound),
    }
}

/// Run `change` on a copy of the record and store the copy only on success.
fn modify<K: Ord, V: Clone, T, E>(
    table: &mut BTreeMap<K, V>,
    key: &K,
    change: impl FnOnce(&mut V) -> Result<T, E>,
) -> Result<Option<T>, E> {
    let Some(slot) = table.get_mut(key) else {
        return Ok(None);
    };
    let mut draft = slot.clone();
    let outcome = change(&mut draft)?;
    *slot = draft;
    Ok(Some(outcome))
}

impl ContentieuxRepository for MemoryStore {
    fn insert_affaire(&self, affaire: Affaire) -> Result<Affaire, RepositoryError> {
        insert_new(&mut self.tables()?.affaires, affaire.id, affaire)
    }

    fn update_affaire(&self, affaire: Affaire) -> Result<(), RepositoryError> {
        replace(&mut self.tables()?.affaires, affaire.id, affaire)
    }

    fn fetch_affaire(&self, id: AffaireId) -> Result<Option<Affaire>, RepositoryError> {
        Ok(self.tables()?.affaires.get(&id).cloned())
    }

    fn find_affaire_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Affaire>, RepositoryError> {
        Ok(self
            .tables()?
            .affaires
            .values()
            .find(|affaire| affaire.reference == reference)
            .cloned())
    }

    fn list_affaires(&self) -> Result<Vec<Affaire>, RepositoryError> {
        Ok(self.tables()?.affaires.values().cloned().collect())
    }

    fn insert_audience(&self, audience: Audience) -> Result<Audience, RepositoryError> {
        insert_new(&mut self.tables()?.audiences, audience.id, audience)
    }

    fn modify_audience<T, E, F>(&self, id: AudienceId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut Audience) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        modify(&mut self.tables()?.audiences, &id, change)
    }

    fn fetch_audience(&self, id: AudienceId) -> Result<Option<Audience>, RepositoryError> {
        Ok(self.tables()?.audiences.get(&id).cloned())
    }

    fn list_audiences(&self) -> Result<Vec<Audience>, RepositoryError> {
        Ok(self.tables()?.audiences.values().cloned().collect())
    }

    fn delete_audience(&self, id: AudienceId) -> Result<(), RepositoryError> {
        self.tables()?
            .audiences
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl ImmobilierRepository for MemoryStore {
    fn insert_immeuble(&self, immeuble: Immeuble) -> Result<Immeuble, RepositoryError> {
        insert_new(&mut self.tables()?.immeubles, immeuble.id, immeuble)
    }

    fn fetch_immeuble(&self, id: ImmeubleId) -> Result<Option<Immeuble>, RepositoryError> {
        Ok(self.tables()?.immeubles.get(&id).cloned())
    }

    fn list_immeubles(&self) -> Result<Vec<Immeuble>, RepositoryError> {
        Ok(self.tables()?.immeubles.values().cloned().collect())
    }

    fn insert_lot(&self, lot: Lot) -> Result<Lot, RepositoryError> {
        insert_new(&mut self.tables()?.lots, lot.id, lot)
    }

    fn update_lot(&self, lot: Lot) -> Result<(), RepositoryError> {
        replace(&mut self.tables()?.lots, lot.id, lot)
    }

    fn fetch_lot(&self, id: LotId) -> Result<Option<Lot>, RepositoryError> {
        Ok(self.tables()?.lots.get(&id).cloned())
    }

    fn list_lots(&self) -> Result<Vec<Lot>, RepositoryError> {
        Ok(self.tables()?.lots.values().cloned().collect())
    }

    fn insert_locataire(&self, locataire: Locataire) -> Result<Locataire, RepositoryError> {
        insert_new(&mut self.tables()?.locataires, locataire.id, locataire)
    }

    fn update_locataire(&self, locataire: Locataire) -> Result<(), RepositoryError> {
        replace(&mut self.tables()?.locataires, locataire.id, locataire)
    }

    fn fetch_locataire(&self, id: LocataireId) -> Result<Option<Locataire>, RepositoryError> {
        Ok(self.tables()?.locataires.get(&id).cloned())
    }

    fn list_locataires(&self) -> Result<Vec<Locataire>, RepositoryError> {
        Ok(self.tables()?.locataires.values().cloned().collect())
    }

    fn insert_bail(&self, bail: Bail) -> Result<Bail, RepositoryError> {
        insert_new(&mut self.tables()?.baux, bail.id, bail)
    }

    fn update_bail(&self, bail: Bail) -> Result<(), RepositoryError> {
        replace(&mut self.tables()?.baux, bail.id, bail)
    }

    fn fetch_bail(&self, id: BailId) -> Result<Option<Bail>, RepositoryError> {
        Ok(self.tables()?.baux.get(&id).cloned())
    }

    fn list_baux(&self) -> Result<Vec<Bail>, RepositoryError> {
        Ok(self.tables()?.baux.values().cloned().collect())
    }

    fn insert_encaissement(
        &self,
        encaissement: EncaissementLoyer,
    ) -> Result<EncaissementLoyer, RepositoryError> {
        insert_new(
            &mut self.tables()?.encaissements,
            encaissement.id,
            encaissement,
        )
    }

    fn list_encaissements(&self) -> Result<Vec<EncaissementLoyer>, RepositoryError> {
        Ok(self.tables()?.encaissements.values().cloned().collect())
    }

    fn insert_depense(&self, depense: DepenseImmeuble) -> Result<DepenseImmeuble, RepositoryError> {
        insert_new(&mut self.tables()?.depenses, depense.id, depense)
    }

    fn list_depenses(&self) -> Result<Vec<DepenseImmeuble>, RepositoryError> {
        Ok(self.tables()?.depenses.values().cloned().collect())
    }
}

impl RecouvrementRepository for MemoryStore {
    fn insert_dossier(
        &self,
        dossier: DossierRecouvrement,
    ) -> Result<DossierRecouvrement, RepositoryError> {
        insert_new(&mut self.tables()?.dossiers, dossier.id, dossier)
    }

    fn modify_dossier<T, E, F>(&self, id: DossierId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut DossierRecouvrement) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        modify(&mut self.tables()?.dossiers, &id, change)
    }

    fn fetch_dossier(&self, id: DossierId) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        Ok(self.tables()?.dossiers.get(&id).cloned())
    }

    fn find_dossier_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<DossierRecouvrement>, RepositoryError> {
        Ok(self
            .tables()?
            .dossiers
            .values()
            .find(|dossier| dossier.reference == reference)
            .cloned())
    }

    fn list_dossiers(&self) -> Result<Vec<DossierRecouvrement>, RepositoryError> {
        Ok(self.tables()?.dossiers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immobilier::{LotStatut, LotType};
    use rust_decimal::Decimal;

    fn lot(id: u64) -> Lot {
        Lot {
            id: LotId(id),
            immeuble_id: ImmeubleId(1),
            numero: format!("L{id}"),
            type_lot: LotType::Studio,
            etage: None,
            superficie: None,
            loyer_mensuel: Decimal::from(300),
            statut: LotStatut::Libre,
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        store.insert_lot(lot(1)).expect("first insert");
        assert!(matches!(
            store.insert_lot(lot(1)),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn update_requires_existing_record() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_lot(lot(9)),
            Err(RepositoryError::NotFound)
        ));

        store.insert_lot(lot(9)).expect("insert");
        let mut occupied = lot(9);
        occupied.statut = LotStatut::Occupe;
        store.update_lot(occupied).expect("update");
        assert_eq!(
            store.fetch_lot(LotId(9)).expect("fetch").map(|lot| lot.statut),
            Some(LotStatut::Occupe)
        );
    }

    #[test]
    fn failed_modification_keeps_the_stored_record() {
        let mut table = BTreeMap::from([(LotId(4), lot(4))]);

        let refused = modify(&mut table, &LotId(4), |lot| {
            lot.statut = LotStatut::Occupe;
            Err::<(), _>("refused")
        });
        assert_eq!(refused, Err("refused"));
        assert_eq!(table[&LotId(4)].statut, LotStatut::Libre);

        let applied = modify(&mut table, &LotId(4), |lot| {
            lot.statut = LotStatut::Occupe;
            Ok::<_, &str>(lot.numero.clone())
        });
        assert_eq!(applied, Ok(Some("L4".to_string())));
        assert_eq!(table[&LotId(4)].statut, LotStatut::Occupe);
        assert_eq!(modify(&mut table, &LotId(5), |_| Ok::<_, &str>(())), Ok(None));
    }

    #[test]
    fn clones_share_tables() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.insert_lot(lot(3)).expect("insert");
        assert_eq!(handle.list_lots().expect("list").len(), 1);
    }
}
