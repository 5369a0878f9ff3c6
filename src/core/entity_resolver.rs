use crate::core::filter::ResolutionFilter;
use crate::core::store::{HierarchyStore, StoreError};
use crate::models::{App, Domain, Ecosystem, EntityId, Level, ResolvedPath, Workspace};
use std::collections::HashMap;
use std::fmt::Write as _;
use thiserror::Error;

/// More than one workspace matched a filter. Carries every candidate's full
/// path, sorted; the resolver never picks one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{count} workspaces match '{filter}'. Refine the filter to select exactly one.", count = .candidates.len())]
pub struct AmbiguousError {
    pub filter: ResolutionFilter,
    pub candidates: Vec<String>,
}

impl AmbiguousError {
    /// A numbered, human-readable list of the candidate paths.
    pub fn format_disambiguation(&self) -> String {
        let mut out = String::new();
        for (i, candidate) in self.candidates.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, candidate);
        }
        out
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No workspace matches '{filter}'.")]
    NotFound { filter: ResolutionFilter },
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousError),
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

/// `true` if `err` carries an ambiguous resolution, at any level of context.
pub fn is_ambiguous_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<AmbiguousError>().is_some()
            || cause
                .downcast_ref::<ResolveError>()
                .is_some_and(ResolveError::is_ambiguous)
    })
}

/// `true` if `err` carries a not-found resolution, at any level of context.
pub fn is_not_found_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ResolveError>()
            .is_some_and(ResolveError::is_not_found)
    })
}

/// The three possible outcomes of resolving a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedPath),
    NotFound,
    Ambiguous(Vec<ResolvedPath>),
}

type ResolveResult<T> = Result<T, ResolveError>;

/// Resolves name filters to concrete workspaces with their ancestor chains.
#[derive(Debug)]
pub struct EntityResolver<'a, S: HierarchyStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: HierarchyStore + ?Sized> EntityResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Classifies `filter` into found / not found / ambiguous.
    /// Store failures are fatal and propagated.
    pub fn evaluate(&self, filter: &ResolutionFilter) -> Result<Resolution, StoreError> {
        let mut matches = self.candidates(filter)?;
        Ok(match matches.len() {
            0 => Resolution::NotFound,
            1 => match matches.pop() {
                Some(path) => Resolution::Found(path),
                None => Resolution::NotFound,
            },
            _ => Resolution::Ambiguous(matches),
        })
    }

    /// Resolves `filter` to exactly one workspace.
    pub fn resolve(&self, filter: &ResolutionFilter) -> ResolveResult<ResolvedPath> {
        match self.evaluate(filter)? {
            Resolution::Found(path) => {
                log::debug!("Filter '{}' resolved to '{}'.", filter, path.full_path());
                Ok(path)
            }
            Resolution::NotFound => Err(ResolveError::NotFound {
                filter: filter.clone(),
            }),
            Resolution::Ambiguous(paths) => Err(AmbiguousError {
                filter: filter.clone(),
                candidates: paths.iter().map(ResolvedPath::full_path).collect(),
            }
            .into()),
        }
    }

    /// Every workspace matching `filter`, sorted by full path. Never ambiguous.
    pub fn resolve_all(&self, filter: &ResolutionFilter) -> ResolveResult<Vec<ResolvedPath>> {
        let matches = self.candidates(filter)?;
        if matches.is_empty() {
            return Err(ResolveError::NotFound {
                filter: filter.clone(),
            });
        }
        Ok(matches)
    }

    /// Builds the full path of a single workspace.
    ///
    /// An ancestor id that does not resolve is reported as
    /// [`StoreError::BrokenParentLink`] on the entity that references it.
    pub fn materialize(&self, workspace: Workspace) -> Result<ResolvedPath, StoreError> {
        let app = self
            .store
            .get_app(workspace.app_id)
            .map_err(|e| e.as_missing_parent_of(Level::Workspace, workspace.id))?;
        let domain = self
            .store
            .get_domain(app.domain_id)
            .map_err(|e| e.as_missing_parent_of(Level::App, app.id))?;
        let ecosystem = self
            .store
            .get_ecosystem(domain.ecosystem_id)
            .map_err(|e| e.as_missing_parent_of(Level::Domain, domain.id))?;
        Ok(ResolvedPath {
            ecosystem,
            domain,
            app,
            workspace,
        })
    }

    /// Candidate enumeration: pre-filter by workspace name, then walk each
    /// candidate's ancestors, discarding it at the first level that does not match.
    fn candidates(&self, filter: &ResolutionFilter) -> Result<Vec<ResolvedPath>, StoreError> {
        let mut workspaces = self.store.list_all_workspaces()?;
        workspaces.retain(|w| filter.admits(Level::Workspace, &w.name));
        log::debug!(
            "{} workspace candidate(s) for filter '{}'.",
            workspaces.len(),
            filter
        );

        let mut ancestors = AncestorCache::default();
        let mut matches = Vec::new();

        for workspace in workspaces {
            let app = ancestors
                .app(self.store, workspace.app_id)
                .map_err(|e| e.as_missing_parent_of(Level::Workspace, workspace.id))?;
            if !filter.admits(Level::App, &app.name) {
                continue;
            }
            let domain = ancestors
                .domain(self.store, app.domain_id)
                .map_err(|e| e.as_missing_parent_of(Level::App, app.id))?;
            if !filter.admits(Level::Domain, &domain.name) {
                continue;
            }
            let ecosystem = ancestors
                .ecosystem(self.store, domain.ecosystem_id)
                .map_err(|e| e.as_missing_parent_of(Level::Domain, domain.id))?;
            if !filter.admits(Level::Ecosystem, &ecosystem.name) {
                continue;
            }
            matches.push(ResolvedPath {
                ecosystem,
                domain,
                app,
                workspace,
            });
        }

        matches.sort_by_cached_key(ResolvedPath::full_path);
        Ok(matches)
    }
}

/// Memoizes id lookups for the duration of one resolution. Workspaces that
/// share an App only fetch it once.
#[derive(Default)]
struct AncestorCache {
    apps: HashMap<EntityId, App>,
    domains: HashMap<EntityId, Domain>,
    ecosystems: HashMap<EntityId, Ecosystem>,
}

impl AncestorCache {
    fn app<S: HierarchyStore + ?Sized>(&mut self, store: &S, id: EntityId) -> Result<App, StoreError> {
        if let Some(app) = self.apps.get(&id) {
            return Ok(app.clone());
        }
        let app = store.get_app(id)?;
        self.apps.insert(id, app.clone());
        Ok(app)
    }

    fn domain<S: HierarchyStore + ?Sized>(
        &mut self,
        store: &S,
        id: EntityId,
    ) -> Result<Domain, StoreError> {
        if let Some(domain) = self.domains.get(&id) {
            return Ok(domain.clone());
        }
        let domain = store.get_domain(id)?;
        self.domains.insert(id, domain.clone());
        Ok(domain)
    }

    fn ecosystem<S: HierarchyStore + ?Sized>(
        &mut self,
        store: &S,
        id: EntityId,
    ) -> Result<Ecosystem, StoreError> {
        if let Some(ecosystem) = self.ecosystems.get(&id) {
            return Ok(ecosystem.clone());
        }
        let ecosystem = store.get_ecosystem(id)?;
        self.ecosystems.insert(id, ecosystem.clone());
        Ok(ecosystem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index_store::IndexStore;
    use crate::core::fixtures::{FailingStore, sample_store};
    use crate::models::HierarchyIndex;
    use std::path::PathBuf;

    fn filter() -> ResolutionFilter {
        ResolutionFilter::default()
    }

    #[test]
    fn test_single_match_by_app_resolves_full_path() {
        let mut store = IndexStore::in_memory(HierarchyIndex::default());
        let eco = store.create_ecosystem("healthcare").unwrap();
        let dom = store.create_domain(eco.id, "backend").unwrap();
        let app = store
            .create_app(dom.id, "portal", PathBuf::from("/src/portal"))
            .unwrap();
        store.create_workspace(app.id, "staging", None).unwrap();

        let path = EntityResolver::new(&store)
            .resolve(&filter().with_app("portal"))
            .unwrap();
        assert_eq!(path.full_path(), "healthcare/backend/portal/staging");
    }

    #[test]
    fn test_same_app_name_in_two_domains_is_ambiguous() {
        let store = sample_store();
        let err = EntityResolver::new(&store)
            .resolve(&filter().with_app("portal").with_workspace("main"))
            .unwrap_err();

        let ResolveError::Ambiguous(ambiguous) = err else {
            panic!("expected ambiguity, got {:?}", err);
        };
        assert_eq!(
            ambiguous.candidates,
            vec![
                "healthcare/backend/portal/main".to_string(),
                "healthcare/frontend/portal/main".to_string(),
            ]
        );
        assert_eq!(
            ambiguous.format_disambiguation(),
            "  1. healthcare/backend/portal/main\n  2. healthcare/frontend/portal/main\n"
        );
    }

    #[test]
    fn test_more_specific_filter_breaks_the_tie() {
        let store = sample_store();
        let path = EntityResolver::new(&store)
            .resolve(
                &filter()
                    .with_domain("frontend")
                    .with_app("portal")
                    .with_workspace("main"),
            )
            .unwrap();
        assert_eq!(path.full_path(), "healthcare/frontend/portal/main");
    }

    #[test]
    fn test_unknown_app_is_not_found() {
        let store = sample_store();
        let err = EntityResolver::new(&store)
            .resolve(&filter().with_app("nonexistent"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_ambiguous());
    }

    #[test]
    fn test_empty_filter_on_empty_store_is_not_found() {
        let store = IndexStore::in_memory(HierarchyIndex::default());
        let resolver = EntityResolver::new(&store);
        assert!(resolver.resolve(&filter()).unwrap_err().is_not_found());
        assert!(resolver.resolve_all(&filter()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_filter_with_many_workspaces_is_ambiguous() {
        let store = sample_store();
        let err = EntityResolver::new(&store).resolve(&filter()).unwrap_err();
        let ResolveError::Ambiguous(ambiguous) = err else {
            panic!("expected ambiguity");
        };
        assert_eq!(ambiguous.candidates.len(), store.index().workspaces.len());
    }

    #[test]
    fn test_resolve_all_returns_every_match_sorted() {
        let store = sample_store();
        let paths = EntityResolver::new(&store)
            .resolve_all(&filter().with_workspace("main"))
            .unwrap();
        let names: Vec<String> = paths.iter().map(ResolvedPath::full_path).collect();
        assert_eq!(
            names,
            vec![
                "healthcare/backend/portal/main",
                "healthcare/frontend/portal/main",
                "retail/backend/shop/main",
            ]
        );
    }

    #[test]
    fn test_ecosystem_filter_limits_candidates() {
        let store = sample_store();
        let paths = EntityResolver::new(&store)
            .resolve_all(&filter().with_ecosystem("retail"))
            .unwrap();
        assert!(paths.iter().all(|p| p.ecosystem.name == "retail"));
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let store = sample_store();
        let resolver = EntityResolver::new(&store);
        let f = filter().with_workspace("main");
        assert_eq!(resolver.evaluate(&f).unwrap(), resolver.evaluate(&f).unwrap());
    }

    #[test]
    fn test_dangling_parent_is_reported_as_broken_link() {
        let mut index = sample_store().index().clone();
        let shop_id = index
            .apps
            .values()
            .find(|a| a.name == "shop")
            .map(|a| a.id)
            .unwrap();
        index.apps.remove(&shop_id);
        let store = IndexStore::in_memory(index);

        let err = EntityResolver::new(&store)
            .resolve(&filter().with_ecosystem("retail"))
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Store(StoreError::BrokenParentLink {
                level: Level::Workspace,
                missing_parent_id,
                ..
            }) if missing_parent_id == shop_id
        ));
    }

    #[test]
    fn test_store_failure_is_fatal_during_resolution() {
        let inner = sample_store();
        let store = FailingStore::new(&inner).fail_level(Level::Domain);
        let err = EntityResolver::new(&store)
            .resolve(&filter().with_workspace("staging"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }

    #[test]
    fn test_error_helpers_see_through_anyhow_context() {
        use anyhow::Context;
        let store = sample_store();
        let resolver = EntityResolver::new(&store);

        let ambiguous: anyhow::Error = resolver
            .resolve(&filter().with_workspace("main"))
            .context("while selecting")
            .unwrap_err();
        assert!(is_ambiguous_error(&ambiguous));
        assert!(!is_not_found_error(&ambiguous));

        let missing: anyhow::Error = resolver
            .resolve(&filter().with_app("ghost"))
            .context("while selecting")
            .unwrap_err();
        assert!(is_not_found_error(&missing));
        assert!(!is_ambiguous_error(&missing));
    }
}
