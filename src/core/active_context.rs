//! # Active Context
//!
//! The "currently selected" workspace. Commands receive it as an explicit
//! [`SelectionContext`] value; persisting it is delegated to an
//! [`ActiveContextWriter`], and a failed write never fails the command that
//! triggered it.

use crate::core::entity_resolver::EntityResolver;
use crate::core::index_store::IndexStore;
use crate::core::store::{HierarchyStore, StoreError, StoreResult};
use crate::models::{ActiveSelection, Level, ResolvedPath, ScopeRef};

/// Persists the active selection somewhere.
pub trait ActiveContextWriter {
    fn write_selection(&mut self, selection: ActiveSelection) -> StoreResult<()>;
}

/// Writes the selection to the store file right away. If the file cannot be
/// written, the previous selection is put back so the store is left unchanged
/// and a later `save` has nothing pending from this write.
impl ActiveContextWriter for IndexStore {
    fn write_selection(&mut self, selection: ActiveSelection) -> StoreResult<()> {
        let previous = self.active_selection()?;
        self.set_active_selection(selection)?;
        if let Err(e) = self.save() {
            self.set_active_selection(previous)?;
            return Err(e);
        }
        Ok(())
    }
}

/// The selection a command operates under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionContext {
    selection: ActiveSelection,
}

impl SelectionContext {
    pub fn new(selection: ActiveSelection) -> Self {
        Self { selection }
    }

    /// Reads the persisted selection. An unreadable selection is treated as empty.
    pub fn load<S: HierarchyStore + ?Sized>(store: &S) -> Self {
        match store.active_selection() {
            Ok(selection) => Self::new(selection),
            Err(e) => {
                log::warn!("Could not read the active selection: {}", e);
                Self::default()
            }
        }
    }

    pub fn selection(&self) -> ActiveSelection {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// The most specific selected entity.
    pub fn deepest_scope(&self) -> Option<ScopeRef> {
        let s = &self.selection;
        s.workspace_id
            .map(|id| ScopeRef::new(Level::Workspace, id))
            .or_else(|| s.app_id.map(|id| ScopeRef::new(Level::App, id)))
            .or_else(|| s.domain_id.map(|id| ScopeRef::new(Level::Domain, id)))
            .or_else(|| s.ecosystem_id.map(|id| ScopeRef::new(Level::Ecosystem, id)))
    }

    /// `true` if `scope` is part of the selected chain.
    pub fn contains(&self, scope: ScopeRef) -> bool {
        let id = match scope.level {
            Level::Ecosystem => self.selection.ecosystem_id,
            Level::Domain => self.selection.domain_id,
            Level::App => self.selection.app_id,
            Level::Workspace => self.selection.workspace_id,
        };
        id == Some(scope.id)
    }

    /// Rebuilds the full path of the selected workspace.
    ///
    /// A selection pointing at an entity that no longer exists yields `None`.
    pub fn current_path<S: HierarchyStore + ?Sized>(
        &self,
        store: &S,
    ) -> StoreResult<Option<ResolvedPath>> {
        let Some(workspace_id) = self.selection.workspace_id else {
            return Ok(None);
        };
        let resolver = EntityResolver::new(store);
        let path = store
            .get_workspace(workspace_id)
            .and_then(|ws| resolver.materialize(ws));
        match path {
            Ok(path) => Ok(Some(path)),
            Err(e @ (StoreError::EntityNotFound { .. } | StoreError::BrokenParentLink { .. })) => {
                log::warn!("Active selection is stale: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Selects `path` and persists it through `writer`.
    ///
    /// The in-memory context is always updated. A write failure is logged and
    /// swallowed.
    pub fn apply<W: ActiveContextWriter + ?Sized>(&mut self, writer: &mut W, path: &ResolvedPath) {
        self.selection = path.selection();
        self.persist(writer);
    }

    /// Clears the selection and persists the empty selection through `writer`.
    pub fn clear<W: ActiveContextWriter + ?Sized>(&mut self, writer: &mut W) {
        self.selection = ActiveSelection::default();
        self.persist(writer);
    }

    fn persist<W: ActiveContextWriter + ?Sized>(&self, writer: &mut W) {
        match writer.write_selection(self.selection) {
            Ok(()) => log::debug!("Active selection persisted: {:?}", self.selection),
            Err(e) => log::warn!("Failed to persist the active selection: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::ResolutionFilter;
    use crate::core::fixtures::sample_store;
    use std::path::PathBuf;

    struct BrokenWriter {
        attempts: usize,
    }

    impl ActiveContextWriter for BrokenWriter {
        fn write_selection(&mut self, _selection: ActiveSelection) -> StoreResult<()> {
            self.attempts += 1;
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    fn staging(store: &IndexStore) -> ResolvedPath {
        EntityResolver::new(store)
            .resolve(&ResolutionFilter::default().with_workspace("staging"))
            .unwrap()
    }

    #[test]
    fn test_apply_persists_and_round_trips() {
        let mut store = sample_store();
        let path = staging(&store);

        let mut context = SelectionContext::load(&store);
        assert!(context.is_empty());
        context.apply(&mut store, &path);

        let reloaded = SelectionContext::load(&store);
        assert_eq!(reloaded, context);
        assert_eq!(reloaded.current_path(&store).unwrap(), Some(path.clone()));
        assert_eq!(
            reloaded.deepest_scope(),
            Some(ScopeRef::new(Level::Workspace, path.workspace.id))
        );
        assert!(reloaded.contains(ScopeRef::new(Level::App, path.app.id)));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let store = sample_store();
        let path = staging(&store);
        let mut writer = BrokenWriter { attempts: 0 };

        let mut context = SelectionContext::default();
        context.apply(&mut writer, &path);

        assert_eq!(writer.attempts, 1);
        assert_eq!(context.selection(), path.selection());
    }

    #[test]
    fn test_clear_empties_the_selection() {
        let mut store = sample_store();
        let path = staging(&store);
        let mut context = SelectionContext::default();
        context.apply(&mut store, &path);

        context.clear(&mut store);
        assert!(SelectionContext::load(&store).is_empty());
        assert_eq!(context.deepest_scope(), None);
    }

    #[test]
    fn test_stale_selection_has_no_current_path() {
        let store = sample_store();
        let context = SelectionContext::new(ActiveSelection {
            workspace_id: Some(999),
            ..Default::default()
        });
        assert_eq!(context.current_path(&store).unwrap(), None);
    }

    #[test]
    fn test_selection_with_a_dangling_parent_is_stale() {
        let store = sample_store();
        let path = staging(&store);
        let mut index = store.index().clone();
        index.apps.remove(&path.app.id);
        let broken = IndexStore::in_memory(index);

        let context = SelectionContext::new(path.selection());
        assert_eq!(context.current_path(&broken).unwrap(), None);
    }

    #[test]
    fn test_failed_store_write_leaves_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let mut store = IndexStore::open(&blocker.join("store.bin")).unwrap();
        let eco = store.create_ecosystem("retail").unwrap();
        let dom = store.create_domain(eco.id, "backend").unwrap();
        let app = store
            .create_app(dom.id, "shop", PathBuf::from("/src/shop"))
            .unwrap();
        store.create_workspace(app.id, "main", None).unwrap();
        store.save().unwrap();

        // The store directory turns into a plain file, so every write fails.
        std::fs::remove_dir_all(&blocker).unwrap();
        std::fs::write(&blocker, b"not a directory").unwrap();

        let path = EntityResolver::new(&store)
            .resolve(&ResolutionFilter::default().with_workspace("main"))
            .unwrap();
        let mut context = SelectionContext::default();
        context.apply(&mut store, &path);

        assert_eq!(context.selection(), path.selection());
        assert!(store.active_selection().unwrap().is_empty());
        assert!(!store.needs_saving());
        assert!(store.save().is_ok());
    }
}
