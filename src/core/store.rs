//! # Hierarchy Store
//!
//! The narrow read interface the resolution engine consumes. Every call is an
//! independent read; the engine never holds a transaction across calls.

use crate::models::{ActiveSelection, App, Domain, Ecosystem, EntityId, Level, ScopeRef, Workspace};
use thiserror::Error;

/// Errors raised by a hierarchy store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A filesystem I/O error occurred.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// An error occurred related to filesystem paths (e.g., config directory not found).
    #[error("Path error: {0}")]
    Path(#[from] crate::core::paths::PathError),
    /// An error occurred while deserializing data from `bincode` binary format.
    #[error("Failed to decode from binary format: {0}")]
    BincodeDecode(#[from] bincode::error::DecodeError),
    /// An error occurred while serializing data to `bincode` binary format.
    #[error("Failed to encode to binary format: {0}")]
    BincodeEncode(#[from] bincode::error::EncodeError),
    /// A lookup by id did not find the entity.
    #[error("{level} with id '{id}' not found in the store.")]
    EntityNotFound {
        /// Level of the missing entity.
        level: Level,
        /// Id that was looked up.
        id: EntityId,
    },
    /// An entity references a parent that does not exist.
    #[error("Broken parent link: {level} '{id}' points to a non-existent parent '{missing_parent_id}'.")]
    BrokenParentLink {
        /// Level of the child entity.
        level: Level,
        /// Id of the child entity.
        id: EntityId,
        /// Id of the parent that could not be found.
        missing_parent_id: EntityId,
    },
    /// A sibling with the same name already exists under the same parent.
    #[error("{level} name '{name}' is already in use under the same parent.")]
    NameAlreadyExists {
        /// Level of the conflicting entity.
        level: Level,
        /// The conflicting name.
        name: String,
    },
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Turns a failed parent lookup into a broken link on the child that
    /// referenced it. Any other error is returned unchanged.
    pub fn as_missing_parent_of(self, level: Level, id: EntityId) -> Self {
        match self {
            Self::EntityNotFound { id: missing, .. } => Self::BrokenParentLink {
                level,
                id,
                missing_parent_id: missing,
            },
            other => other,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to the Ecosystem → Domain → App → Workspace hierarchy and its
/// scoped overrides, plus the single write the engine performs: the active selection.
pub trait HierarchyStore {
    fn find_ecosystem_by_name(&self, name: &str) -> StoreResult<Option<Ecosystem>>;
    fn find_domain_by_name(&self, ecosystem_id: EntityId, name: &str) -> StoreResult<Option<Domain>>;
    fn find_app_by_name(&self, domain_id: EntityId, name: &str) -> StoreResult<Option<App>>;
    /// Apps with this name across every domain.
    fn find_apps_by_name(&self, name: &str) -> StoreResult<Vec<App>>;
    fn find_workspace_by_name(&self, app_id: EntityId, name: &str) -> StoreResult<Option<Workspace>>;

    fn list_all_workspaces(&self) -> StoreResult<Vec<Workspace>>;

    fn get_ecosystem(&self, id: EntityId) -> StoreResult<Ecosystem>;
    fn get_domain(&self, id: EntityId) -> StoreResult<Domain>;
    fn get_app(&self, id: EntityId) -> StoreResult<App>;
    fn get_workspace(&self, id: EntityId) -> StoreResult<Workspace>;

    /// The explicit override for `key` at `scope`, or `None` to inherit.
    fn get_override(&self, scope: ScopeRef, key: &str) -> StoreResult<Option<String>>;
    /// Keys of every override at `scope` that start with `prefix`.
    fn list_override_keys(&self, scope: ScopeRef, prefix: &str) -> StoreResult<Vec<String>>;

    fn active_selection(&self) -> StoreResult<ActiveSelection>;
    fn set_active_selection(&mut self, selection: ActiveSelection) -> StoreResult<()>;

    /// Name and parent scope of the entity at `scope`.
    ///
    /// Used by ancestor walks, which only need id-indexed hops toward the root.
    fn describe(&self, scope: ScopeRef) -> StoreResult<(String, Option<ScopeRef>)> {
        match scope.level {
            Level::Ecosystem => {
                let e = self.get_ecosystem(scope.id)?;
                Ok((e.name, None))
            }
            Level::Domain => {
                let d = self.get_domain(scope.id)?;
                Ok((d.name, Some(ScopeRef::new(Level::Ecosystem, d.ecosystem_id))))
            }
            Level::App => {
                let a = self.get_app(scope.id)?;
                Ok((a.name, Some(ScopeRef::new(Level::Domain, a.domain_id))))
            }
            Level::Workspace => {
                let w = self.get_workspace(scope.id)?;
                Ok((w.name, Some(ScopeRef::new(Level::App, w.app_id))))
            }
        }
    }
}
