use crate::core::store::{HierarchyStore, StoreError, StoreResult};
use crate::models::{
    ActiveSelection, App, Domain, Ecosystem, EntityId, HierarchyIndex, Level, ScopeRef, Timestamp,
    Workspace, WorkspaceStatus,
};
use crate::state::JournaledIndex;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::{fs, path::Path, path::PathBuf};

/// The bincode-persisted implementation of [`HierarchyStore`].
///
/// The whole hierarchy is loaded in memory; `save` writes it back only when a
/// mutation actually changed it.
#[derive(Debug)]
pub struct IndexStore {
    journal: JournaledIndex,
    path: Option<PathBuf>,
}

impl IndexStore {
    /// A store that lives only in memory. `save` is a no-op.
    pub fn in_memory(index: HierarchyIndex) -> Self {
        Self {
            journal: JournaledIndex::new(index),
            path: None,
        }
    }

    /// Loads the store file at `path`. A missing file yields an empty hierarchy.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let index = match fs::read(path) {
            Ok(bytes) if bytes.is_empty() => HierarchyIndex::default(),
            Ok(bytes) => {
                let (index, _): (HierarchyIndex, usize) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
                index
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No store at '{}'. Starting empty.", path.display());
                HierarchyIndex::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            journal: JournaledIndex::new(index),
            path: Some(path.to_path_buf()),
        })
    }

    /// Writes the hierarchy to disk if it changed since it was loaded.
    pub fn save(&mut self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.journal.needs_saving() {
            log::debug!("Store unchanged. Skipping save.");
            return Ok(());
        }
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
        }
        let bytes = bincode::serde::encode_to_vec(self.journal.index(), bincode::config::standard())?;
        fs::write(path, bytes)?;
        log::debug!("Store saved to '{}'.", path.display());
        self.journal.mark_saved();
        Ok(())
    }

    pub fn index(&self) -> &HierarchyIndex {
        self.journal.index()
    }

    pub fn needs_saving(&self) -> bool {
        self.journal.needs_saving()
    }

    // --- CRUD ---

    pub fn create_ecosystem(&mut self, name: &str) -> StoreResult<Ecosystem> {
        if self.find_ecosystem_by_name(name)?.is_some() {
            return Err(name_taken(Level::Ecosystem, name));
        }
        let now = Timestamp::now();
        let index = self.journal.index_mut();
        let ecosystem = Ecosystem {
            id: next_id(index),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        index.ecosystems.insert(ecosystem.id, ecosystem.clone());
        Ok(ecosystem)
    }

    pub fn create_domain(&mut self, ecosystem_id: EntityId, name: &str) -> StoreResult<Domain> {
        self.get_ecosystem(ecosystem_id)?;
        if self.find_domain_by_name(ecosystem_id, name)?.is_some() {
            return Err(name_taken(Level::Domain, name));
        }
        let now = Timestamp::now();
        let index = self.journal.index_mut();
        let domain = Domain {
            id: next_id(index),
            ecosystem_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        index.domains.insert(domain.id, domain.clone());
        Ok(domain)
    }

    pub fn create_app(&mut self, domain_id: EntityId, name: &str, path: PathBuf) -> StoreResult<App> {
        self.get_domain(domain_id)?;
        if self.find_app_by_name(domain_id, name)?.is_some() {
            return Err(name_taken(Level::App, name));
        }
        let now = Timestamp::now();
        let index = self.journal.index_mut();
        let app = App {
            id: next_id(index),
            domain_id,
            name: name.to_string(),
            path,
            created_at: now,
            updated_at: now,
        };
        index.apps.insert(app.id, app.clone());
        Ok(app)
    }

    pub fn create_workspace(
        &mut self,
        app_id: EntityId,
        name: &str,
        image: Option<String>,
    ) -> StoreResult<Workspace> {
        self.get_app(app_id)?;
        if self.find_workspace_by_name(app_id, name)?.is_some() {
            return Err(name_taken(Level::Workspace, name));
        }
        let now = Timestamp::now();
        let index = self.journal.index_mut();
        let workspace = Workspace {
            id: next_id(index),
            app_id,
            name: name.to_string(),
            image,
            status: WorkspaceStatus::Created,
            created_at: now,
            updated_at: now,
        };
        index.workspaces.insert(workspace.id, workspace.clone());
        Ok(workspace)
    }

    /// Removes an entity and all of its descendants, together with their
    /// overrides. Clears the active selection if it pointed into the removed subtree.
    ///
    /// # Returns
    /// The number of entities removed.
    pub fn delete_recursive(&mut self, scope: ScopeRef) -> StoreResult<usize> {
        self.describe(scope)?;
        let doomed = self.descendants_of(scope);

        let index = self.journal.index_mut();
        for s in &doomed {
            match s.level {
                Level::Ecosystem => {
                    index.ecosystems.remove(&s.id);
                }
                Level::Domain => {
                    index.domains.remove(&s.id);
                }
                Level::App => {
                    index.apps.remove(&s.id);
                }
                Level::Workspace => {
                    index.workspaces.remove(&s.id);
                }
            }
            index.overrides.remove(s);
        }

        let active = index.active;
        let points_into = |level: Level, id: Option<EntityId>| {
            id.is_some_and(|id| doomed.contains(&ScopeRef::new(level, id)))
        };
        if points_into(Level::Ecosystem, active.ecosystem_id)
            || points_into(Level::Domain, active.domain_id)
            || points_into(Level::App, active.app_id)
            || points_into(Level::Workspace, active.workspace_id)
        {
            log::debug!("Active selection pointed into a deleted subtree. Clearing it.");
            index.active = ActiveSelection::default();
        }

        Ok(doomed.len())
    }

    /// The entity itself plus every entity below it.
    pub fn descendants_of(&self, scope: ScopeRef) -> HashSet<ScopeRef> {
        let index = self.index();
        let mut found = HashSet::new();
        let mut to_visit = vec![scope];

        while let Some(current) = to_visit.pop() {
            if !found.insert(current) {
                continue;
            }
            let children: Vec<ScopeRef> = match current.level {
                Level::Ecosystem => index
                    .domains
                    .values()
                    .filter(|d| d.ecosystem_id == current.id)
                    .map(|d| ScopeRef::new(Level::Domain, d.id))
                    .collect(),
                Level::Domain => index
                    .apps
                    .values()
                    .filter(|a| a.domain_id == current.id)
                    .map(|a| ScopeRef::new(Level::App, a.id))
                    .collect(),
                Level::App => index
                    .workspaces
                    .values()
                    .filter(|w| w.app_id == current.id)
                    .map(|w| ScopeRef::new(Level::Workspace, w.id))
                    .collect(),
                Level::Workspace => Vec::new(),
            };
            to_visit.extend(children);
        }
        found
    }

    /// Sets (or replaces) the override for `key` at `scope`.
    pub fn set_override(&mut self, scope: ScopeRef, key: &str, value: &str) -> StoreResult<()> {
        self.describe(scope)?;
        self.journal
            .index_mut()
            .overrides
            .entry(scope)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes the override for `key` at `scope`. Returns `true` if one existed.
    pub fn remove_override(&mut self, scope: ScopeRef, key: &str) -> bool {
        if !self
            .index()
            .overrides
            .get(&scope)
            .is_some_and(|m| m.contains_key(key))
        {
            return false;
        }
        let index = self.journal.index_mut();
        let mut removed = false;
        if let Some(map) = index.overrides.get_mut(&scope) {
            removed = map.remove(key).is_some();
            if map.is_empty() {
                index.overrides.remove(&scope);
            }
        }
        removed
    }
}

fn next_id(index: &mut HierarchyIndex) -> EntityId {
    index.last_id += 1;
    index.last_id
}

fn name_taken(level: Level, name: &str) -> StoreError {
    StoreError::NameAlreadyExists {
        level,
        name: name.to_string(),
    }
}

impl HierarchyStore for IndexStore {
    fn find_ecosystem_by_name(&self, name: &str) -> StoreResult<Option<Ecosystem>> {
        Ok(self
            .index()
            .ecosystems
            .values()
            .find(|e| e.name == name)
            .cloned())
    }

    fn find_domain_by_name(&self, ecosystem_id: EntityId, name: &str) -> StoreResult<Option<Domain>> {
        Ok(self
            .index()
            .domains
            .values()
            .find(|d| d.ecosystem_id == ecosystem_id && d.name == name)
            .cloned())
    }

    fn find_app_by_name(&self, domain_id: EntityId, name: &str) -> StoreResult<Option<App>> {
        Ok(self
            .index()
            .apps
            .values()
            .find(|a| a.domain_id == domain_id && a.name == name)
            .cloned())
    }

    fn find_apps_by_name(&self, name: &str) -> StoreResult<Vec<App>> {
        Ok(self
            .index()
            .apps
            .values()
            .filter(|a| a.name == name)
            .cloned()
            .collect())
    }

    fn find_workspace_by_name(&self, app_id: EntityId, name: &str) -> StoreResult<Option<Workspace>> {
        Ok(self
            .index()
            .workspaces
            .values()
            .find(|w| w.app_id == app_id && w.name == name)
            .cloned())
    }

    fn list_all_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        Ok(self.index().workspaces.values().cloned().collect())
    }

    fn get_ecosystem(&self, id: EntityId) -> StoreResult<Ecosystem> {
        self.index()
            .ecosystems
            .get(&id)
            .cloned()
            .ok_or(StoreError::EntityNotFound {
                level: Level::Ecosystem,
                id,
            })
    }

    fn get_domain(&self, id: EntityId) -> StoreResult<Domain> {
        self.index()
            .domains
            .get(&id)
            .cloned()
            .ok_or(StoreError::EntityNotFound {
                level: Level::Domain,
                id,
            })
    }

    fn get_app(&self, id: EntityId) -> StoreResult<App> {
        self.index()
            .apps
            .get(&id)
            .cloned()
            .ok_or(StoreError::EntityNotFound { level: Level::App, id })
    }

    fn get_workspace(&self, id: EntityId) -> StoreResult<Workspace> {
        self.index()
            .workspaces
            .get(&id)
            .cloned()
            .ok_or(StoreError::EntityNotFound {
                level: Level::Workspace,
                id,
            })
    }

    fn get_override(&self, scope: ScopeRef, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .index()
            .overrides
            .get(&scope)
            .and_then(|m| m.get(key))
            .cloned())
    }

    fn list_override_keys(&self, scope: ScopeRef, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .index()
            .overrides
            .get(&scope)
            .map(|m| {
                m.keys()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn active_selection(&self) -> StoreResult<ActiveSelection> {
        Ok(self.index().active)
    }

    fn set_active_selection(&mut self, selection: ActiveSelection) -> StoreResult<()> {
        self.journal.index_mut().active = selection;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_app() -> (IndexStore, App) {
        let mut store = IndexStore::in_memory(HierarchyIndex::default());
        let eco = store.create_ecosystem("healthcare").unwrap();
        let dom = store.create_domain(eco.id, "backend").unwrap();
        let app = store
            .create_app(dom.id, "portal", PathBuf::from("/src/portal"))
            .unwrap();
        (store, app)
    }

    #[test]
    fn test_ids_are_unique_across_levels() {
        let (mut store, app) = store_with_app();
        let ws = store.create_workspace(app.id, "staging", None).unwrap();
        assert_eq!(ws.id, 4);
        assert_eq!(store.index().last_id, 4);
    }

    #[test]
    fn test_sibling_names_must_be_unique() {
        let (mut store, app) = store_with_app();
        store.create_workspace(app.id, "main", None).unwrap();
        let err = store.create_workspace(app.id, "main", None).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NameAlreadyExists {
                level: Level::Workspace,
                ..
            }
        ));
    }

    #[test]
    fn test_same_name_allowed_under_different_parents() {
        let (mut store, app) = store_with_app();
        let eco_id = store.get_domain(app.domain_id).unwrap().ecosystem_id;
        let other_domain = store.create_domain(eco_id, "frontend").unwrap();
        store
            .create_app(other_domain.id, "portal", PathBuf::from("/src/portal-web"))
            .unwrap();
        assert_eq!(store.find_apps_by_name("portal").unwrap().len(), 2);
    }

    #[test]
    fn test_create_under_missing_parent_fails() {
        let mut store = IndexStore::in_memory(HierarchyIndex::default());
        let err = store.create_domain(99, "backend").unwrap_err();
        assert!(matches!(
            err,
            StoreError::EntityNotFound {
                level: Level::Ecosystem,
                id: 99
            }
        ));
    }

    #[test]
    fn test_delete_recursive_removes_subtree_overrides_and_active() {
        let (mut store, app) = store_with_app();
        let ws = store.create_workspace(app.id, "staging", None).unwrap();
        let ws_scope = ScopeRef::new(Level::Workspace, ws.id);
        store.set_override(ws_scope, "theme", "dark").unwrap();
        store
            .set_active_selection(ActiveSelection {
                workspace_id: Some(ws.id),
                ..Default::default()
            })
            .unwrap();

        let removed = store
            .delete_recursive(ScopeRef::new(Level::Domain, app.domain_id))
            .unwrap();

        assert_eq!(removed, 3); // domain, app, workspace
        assert!(store.index().workspaces.is_empty());
        assert!(store.index().overrides.is_empty());
        assert!(store.index().active.is_empty());
        assert_eq!(store.index().ecosystems.len(), 1);
    }

    #[test]
    fn test_override_set_get_remove() {
        let (mut store, app) = store_with_app();
        let scope = ScopeRef::new(Level::App, app.id);
        store.set_override(scope, "credential.API_KEY", "k").unwrap();
        store.set_override(scope, "theme", "dark").unwrap();

        assert_eq!(
            store.get_override(scope, "theme").unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(
            store.list_override_keys(scope, "credential.").unwrap(),
            vec!["credential.API_KEY".to_string()]
        );
        assert!(store.remove_override(scope, "theme"));
        assert!(!store.remove_override(scope, "theme"));
        assert_eq!(store.get_override(scope, "theme").unwrap(), None);
    }

    #[test]
    fn test_override_on_missing_entity_fails() {
        let mut store = IndexStore::in_memory(HierarchyIndex::default());
        let err = store
            .set_override(ScopeRef::new(Level::App, 5), "theme", "dark")
            .unwrap_err();
        assert!(matches!(err, StoreError::EntityNotFound { .. }));
    }

    #[test]
    fn test_save_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.bin");

        let mut store = IndexStore::open(&path).unwrap();
        assert!(store.index().ecosystems.is_empty());
        let eco = store.create_ecosystem("healthcare").unwrap();
        assert!(store.needs_saving());
        store.save().unwrap();
        assert!(!store.needs_saving());

        let reopened = IndexStore::open(&path).unwrap();
        assert_eq!(reopened.get_ecosystem(eco.id).unwrap().name, "healthcare");
    }

    #[test]
    fn test_corrupt_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
        assert!(matches!(
            IndexStore::open(&path),
            Err(StoreError::BincodeDecode(_))
        ));
    }
}
