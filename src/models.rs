// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::PATH_SEPARATOR;

/// Integer identity shared by every entity of the hierarchy.
pub type EntityId = u64;

// --- HIERARCHY LEVELS ---

/// One of the four levels of the containment hierarchy, root first.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Ecosystem,
    Domain,
    App,
    Workspace,
}

impl Level {
    /// All levels from the most specific to the root.
    pub const MOST_SPECIFIC_FIRST: [Self; 4] =
        [Self::Workspace, Self::App, Self::Domain, Self::Ecosystem];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Domain => "domain",
            Self::App => "app",
            Self::Workspace => "workspace",
        }
    }

    /// The level that contains this one, or `None` for the root.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Ecosystem => None,
            Self::Domain => Some(Self::Ecosystem),
            Self::App => Some(Self::Domain),
            Self::Workspace => Some(Self::App),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ecosystem" | "eco" => Ok(Self::Ecosystem),
            "domain" | "dom" => Ok(Self::Domain),
            "app" | "application" => Ok(Self::App),
            "workspace" | "ws" => Ok(Self::Workspace),
            other => Err(format!(
                "unknown level '{}' (expected ecosystem, domain, app or workspace)",
                other
            )),
        }
    }
}

/// A `SystemTime` wrapper that is serializable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self(time.duration_since(UNIX_EPOCH).unwrap_or_default())
    }
}

impl From<Timestamp> for SystemTime {
    fn from(time: Timestamp) -> Self {
        UNIX_EPOCH + time.0
    }
}

// --- HIERARCHY ENTITIES ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Ecosystem {
    pub id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub id: EntityId,
    pub ecosystem_id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub id: EntityId,
    pub domain_id: EntityId,
    pub name: String,
    /// Root of the application's source tree.
    pub path: PathBuf,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Runtime status of a workspace container.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkspaceStatus {
    #[default]
    Created,
    Running,
    Stopped,
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: EntityId,
    pub app_id: EntityId,
    pub name: String,
    /// Container image the workspace runs on, once built.
    pub image: Option<String>,
    #[serde(default)]
    pub status: WorkspaceStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Identifies a single entity: its level and id.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeRef {
    pub level: Level,
    pub id: EntityId,
}

impl ScopeRef {
    pub fn new(level: Level, id: EntityId) -> Self {
        Self { level, id }
    }
}

/// The persisted "currently selected" entity chain.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveSelection {
    pub ecosystem_id: Option<EntityId>,
    pub domain_id: Option<EntityId>,
    pub app_id: Option<EntityId>,
    pub workspace_id: Option<EntityId>,
}

impl ActiveSelection {
    pub fn is_empty(&self) -> bool {
        self.ecosystem_id.is_none()
            && self.domain_id.is_none()
            && self.app_id.is_none()
            && self.workspace_id.is_none()
    }
}

// --- STORE MODEL ---

/// The whole persisted hierarchy, as written to `store.bin`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyIndex {
    /// The last id handed out. Ids are never reused.
    #[serde(default)]
    pub last_id: EntityId,
    #[serde(default)]
    pub ecosystems: BTreeMap<EntityId, Ecosystem>,
    #[serde(default)]
    pub domains: BTreeMap<EntityId, Domain>,
    #[serde(default)]
    pub apps: BTreeMap<EntityId, App>,
    #[serde(default)]
    pub workspaces: BTreeMap<EntityId, Workspace>,
    /// Scoped override records: (level, id) -> key -> value.
    #[serde(default)]
    pub overrides: HashMap<ScopeRef, BTreeMap<String, String>>,
    #[serde(default)]
    pub active: ActiveSelection,
}

// --- RESOLUTION MODELS ---

/// A Workspace together with its full ancestor chain.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub ecosystem: Ecosystem,
    pub domain: Domain,
    pub app: App,
    pub workspace: Workspace,
}

impl ResolvedPath {
    /// Slash-joined names, e.g. `healthcare/backend/portal/staging`.
    pub fn full_path(&self) -> String {
        [
            self.ecosystem.name.as_str(),
            self.domain.name.as_str(),
            self.app.name.as_str(),
            self.workspace.name.as_str(),
        ]
        .join(PATH_SEPARATOR)
    }

    /// The id chain of this path, as persisted by the active context.
    pub fn selection(&self) -> ActiveSelection {
        ActiveSelection {
            ecosystem_id: Some(self.ecosystem.id),
            domain_id: Some(self.domain.id),
            app_id: Some(self.app.id),
            workspace_id: Some(self.workspace.id),
        }
    }

    /// Scope of the entity at `level` within this path.
    pub fn scope_at(&self, level: Level) -> ScopeRef {
        let id = match level {
            Level::Ecosystem => self.ecosystem.id,
            Level::Domain => self.domain.id,
            Level::App => self.app.id,
            Level::Workspace => self.workspace.id,
        };
        ScopeRef::new(level, id)
    }
}

/// Where a cascade step looked for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeLevel {
    Entity(Level),
    Global,
    Environment,
}

impl fmt::Display for CascadeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(level) => write!(f, "{}", level),
            Self::Global => f.write_str("global"),
            Self::Environment => f.write_str("environment"),
        }
    }
}

impl Serialize for CascadeLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single step of a cascade walk.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub level: CascadeLevel,
    pub entity_name: String,
    pub found: bool,
    pub value: Option<String>,
    pub error: Option<String>,
}

/// Ordered record of a cascade walk, most specific first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionTrace {
    pub steps: Vec<TraceStep>,
}

impl ResolutionTrace {
    /// The first step that supplied a value.
    pub fn first_found(&self) -> Option<&TraceStep> {
        self.steps.iter().find(|s| s.found)
    }
}

// --- GLOBAL CONFIG ---

/// The deserialized structure of the global `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Theme applied when no level of the hierarchy sets one.
    pub theme: Option<String>,
    /// Credential values applied when no level of the hierarchy sets them.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// Location of the store file. Supports `~` and `$VAR` expansion.
    pub store_path: Option<String>,
}
