//! Shared test fixtures: a populated in-memory store and a store wrapper that
//! fails on demand.

use crate::core::index_store::IndexStore;
use crate::core::store::{HierarchyStore, StoreError, StoreResult};
use crate::models::{
    ActiveSelection, App, Domain, Ecosystem, EntityId, HierarchyIndex, Level, ScopeRef, Workspace,
};
use std::path::PathBuf;

/// healthcare/backend/portal/{main,staging}
/// healthcare/frontend/portal/main
/// retail/backend/shop/main
pub(crate) fn sample_store() -> IndexStore {
    let mut store = IndexStore::in_memory(HierarchyIndex::default());
    let healthcare = store.create_ecosystem("healthcare").unwrap();
    let retail = store.create_ecosystem("retail").unwrap();

    let hc_backend = store.create_domain(healthcare.id, "backend").unwrap();
    let hc_frontend = store.create_domain(healthcare.id, "frontend").unwrap();
    let rt_backend = store.create_domain(retail.id, "backend").unwrap();

    let portal_api = store
        .create_app(hc_backend.id, "portal", PathBuf::from("/src/portal-api"))
        .unwrap();
    let portal_web = store
        .create_app(hc_frontend.id, "portal", PathBuf::from("/src/portal-web"))
        .unwrap();
    let shop = store
        .create_app(rt_backend.id, "shop", PathBuf::from("/src/shop"))
        .unwrap();

    store.create_workspace(portal_api.id, "main", None).unwrap();
    store.create_workspace(portal_api.id, "staging", None).unwrap();
    store.create_workspace(portal_web.id, "main", None).unwrap();
    store.create_workspace(shop.id, "main", None).unwrap();
    store
}

/// Looks up the ids along `eco/dom/app/ws` in `store`.
pub(crate) fn scope_of(store: &IndexStore, path: &str) -> ScopeRef {
    let parts: Vec<&str> = path.split('/').collect();
    let eco = store.find_ecosystem_by_name(parts[0]).unwrap().unwrap();
    let mut scope = ScopeRef::new(Level::Ecosystem, eco.id);
    if let Some(name) = parts.get(1) {
        let dom = store.find_domain_by_name(scope.id, name).unwrap().unwrap();
        scope = ScopeRef::new(Level::Domain, dom.id);
    }
    if let Some(name) = parts.get(2) {
        let app = store.find_app_by_name(scope.id, name).unwrap().unwrap();
        scope = ScopeRef::new(Level::App, app.id);
    }
    if let Some(name) = parts.get(3) {
        let ws = store.find_workspace_by_name(scope.id, name).unwrap().unwrap();
        scope = ScopeRef::new(Level::Workspace, ws.id);
    }
    scope
}

/// Delegates reads to an [`IndexStore`], failing the configured operations
/// with [`StoreError::Unavailable`].
pub(crate) struct FailingStore<'a> {
    inner: &'a IndexStore,
    entity_level: Option<Level>,
    override_level: Option<Level>,
}

impl<'a> FailingStore<'a> {
    pub(crate) fn new(inner: &'a IndexStore) -> Self {
        Self {
            inner,
            entity_level: None,
            override_level: None,
        }
    }

    /// Id lookups of entities at `level` fail.
    pub(crate) fn fail_level(mut self, level: Level) -> Self {
        self.entity_level = Some(level);
        self
    }

    /// Override lookups at `level` fail.
    pub(crate) fn fail_overrides_at(mut self, level: Level) -> Self {
        self.override_level = Some(level);
        self
    }

    fn check(&self, level: Level) -> StoreResult<()> {
        if self.entity_level == Some(level) {
            return Err(StoreError::Unavailable(format!("{} table offline", level)));
        }
        Ok(())
    }
}

impl HierarchyStore for FailingStore<'_> {
    fn find_ecosystem_by_name(&self, name: &str) -> StoreResult<Option<Ecosystem>> {
        self.inner.find_ecosystem_by_name(name)
    }

    fn find_domain_by_name(&self, ecosystem_id: EntityId, name: &str) -> StoreResult<Option<Domain>> {
        self.inner.find_domain_by_name(ecosystem_id, name)
    }

    fn find_app_by_name(&self, domain_id: EntityId, name: &str) -> StoreResult<Option<App>> {
        self.inner.find_app_by_name(domain_id, name)
    }

    fn find_apps_by_name(&self, name: &str) -> StoreResult<Vec<App>> {
        self.inner.find_apps_by_name(name)
    }

    fn find_workspace_by_name(&self, app_id: EntityId, name: &str) -> StoreResult<Option<Workspace>> {
        self.inner.find_workspace_by_name(app_id, name)
    }

    fn list_all_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        self.inner.list_all_workspaces()
    }

    fn get_ecosystem(&self, id: EntityId) -> StoreResult<Ecosystem> {
        self.check(Level::Ecosystem)?;
        self.inner.get_ecosystem(id)
    }

    fn get_domain(&self, id: EntityId) -> StoreResult<Domain> {
        self.check(Level::Domain)?;
        self.inner.get_domain(id)
    }

    fn get_app(&self, id: EntityId) -> StoreResult<App> {
        self.check(Level::App)?;
        self.inner.get_app(id)
    }

    fn get_workspace(&self, id: EntityId) -> StoreResult<Workspace> {
        self.check(Level::Workspace)?;
        self.inner.get_workspace(id)
    }

    fn get_override(&self, scope: ScopeRef, key: &str) -> StoreResult<Option<String>> {
        if self.override_level == Some(scope.level) {
            return Err(StoreError::Unavailable("override table offline".into()));
        }
        self.inner.get_override(scope, key)
    }

    fn list_override_keys(&self, scope: ScopeRef, prefix: &str) -> StoreResult<Vec<String>> {
        if self.override_level == Some(scope.level) {
            return Err(StoreError::Unavailable("override table offline".into()));
        }
        self.inner.list_override_keys(scope, prefix)
    }

    fn active_selection(&self) -> StoreResult<ActiveSelection> {
        self.inner.active_selection()
    }

    fn set_active_selection(&mut self, _selection: ActiveSelection) -> StoreResult<()> {
        Err(StoreError::Unavailable("read-only replica".into()))
    }
}
