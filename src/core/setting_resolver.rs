// src/core/setting_resolver.rs

use crate::constants::{CREDENTIAL_KEY_PREFIX, DEFAULT_THEME, THEME_KEY};
use crate::core::cascade::{Cascade, CascadeOutcome, Layer};
use crate::core::store::HierarchyStore;
use crate::models::{CascadeLevel, EntityId, GlobalConfig, Level, ResolutionTrace, ScopeRef};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env::VarError;

const GLOBAL_LAYER_NAME: &str = "config.toml";
const DEFAULT_LAYER_NAME: &str = "built-in default";
const ENVIRONMENT_LAYER_NAME: &str = "process environment";

/// Where forced credential values come from.
pub trait EnvSource {
    /// The value of `name`, or `None` if it is not set.
    fn var(&self, name: &str) -> Result<Option<String>, VarError>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Result<Option<String>, VarError> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Result<Option<String>, VarError> {
        Ok(self.get(name).cloned())
    }
}

/// The effective value of one setting, together with how it was found.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSetting {
    pub key: String,
    pub value: Option<String>,
    /// Level that supplied `value`.
    pub source: Option<CascadeLevel>,
    /// Name of the entity (or layer) that supplied `value`.
    pub source_name: Option<String>,
    pub trace: ResolutionTrace,
}

impl From<(String, CascadeOutcome)> for ResolvedSetting {
    fn from((key, outcome): (String, CascadeOutcome)) -> Self {
        let (source, source_name) = match outcome.source {
            Some(step) => (Some(step.level), Some(step.entity_name)),
            None => (None, None),
        };
        Self {
            key,
            value: outcome.value,
            source,
            source_name,
            trace: outcome.trace,
        }
    }
}

/// The settings a key can address.
enum SettingKind<'k> {
    Theme,
    Credential(&'k str),
    Other,
}

impl<'k> SettingKind<'k> {
    fn of(key: &'k str) -> Self {
        if key == THEME_KEY {
            Self::Theme
        } else if let Some(name) = key.strip_prefix(CREDENTIAL_KEY_PREFIX) {
            Self::Credential(name)
        } else {
            Self::Other
        }
    }
}

/// The store key of the credential override `name`.
pub fn credential_key(name: &str) -> String {
    format!("{}{}", CREDENTIAL_KEY_PREFIX, name)
}

/// Resolves settings by walking overrides from an entity toward the root,
/// then the global configuration, then (for credentials) the environment.
#[derive(Debug)]
pub struct CascadeResolver<'a, S: HierarchyStore + ?Sized, E: EnvSource = ProcessEnv> {
    store: &'a S,
    config: &'a GlobalConfig,
    env: E,
}

impl<'a, S: HierarchyStore + ?Sized> CascadeResolver<'a, S, ProcessEnv> {
    pub fn new(store: &'a S, config: &'a GlobalConfig) -> Self {
        Self::with_env(store, config, ProcessEnv)
    }
}

impl<'a, S: HierarchyStore + ?Sized, E: EnvSource> CascadeResolver<'a, S, E> {
    pub fn with_env(store: &'a S, config: &'a GlobalConfig, env: E) -> Self {
        Self { store, config, env }
    }

    /// Resolves `key` starting at the entity `(level, id)`.
    ///
    /// `theme` falls back to the global theme and then the built-in default.
    /// `credential.<NAME>` falls back to the global credentials, and the
    /// environment variable `<NAME>` wins over everything when set.
    /// Other keys only walk the hierarchy.
    pub fn resolve_setting(&self, level: Level, id: EntityId, key: &str) -> ResolvedSetting {
        let start = ScopeRef::new(level, id);
        let mut cascade = Cascade::new(key);
        self.walk_hierarchy(&mut cascade, start, key);

        match SettingKind::of(key) {
            SettingKind::Theme => {
                let (name, theme) = match &self.config.theme {
                    Some(theme) => (GLOBAL_LAYER_NAME, theme.clone()),
                    None => (DEFAULT_LAYER_NAME, DEFAULT_THEME.to_string()),
                };
                cascade.consult(Layer::inherit(CascadeLevel::Global, name), || {
                    Ok::<_, VarError>(Some(theme))
                });
            }
            SettingKind::Credential(name) => {
                cascade.consult(
                    Layer::inherit(CascadeLevel::Global, GLOBAL_LAYER_NAME),
                    || Ok::<_, VarError>(self.config.credentials.get(name).cloned()),
                );
                cascade.consult(
                    Layer::force(CascadeLevel::Environment, ENVIRONMENT_LAYER_NAME),
                    || self.env.var(name),
                );
            }
            SettingKind::Other => {}
        }

        (key.to_string(), cascade.finish()).into()
    }

    /// The effective theme of an entity.
    pub fn resolve_theme(&self, scope: ScopeRef) -> ResolvedSetting {
        self.resolve_setting(scope.level, scope.id, THEME_KEY)
    }

    /// The effective value of a single credential.
    pub fn resolve_credential(&self, scope: ScopeRef, name: &str) -> ResolvedSetting {
        self.resolve_setting(scope.level, scope.id, &credential_key(name))
    }

    /// Every credential visible from `scope`, keyed by credential name.
    ///
    /// The key set is the union of the credentials overridden anywhere along the
    /// chain and those in the global configuration. Each is then resolved on
    /// its own, so environment values replace hierarchy values.
    pub fn resolve_credentials(&self, scope: ScopeRef) -> BTreeMap<String, ResolvedSetting> {
        let mut names: BTreeSet<String> = self.config.credentials.keys().cloned().collect();

        let mut next = Some(scope);
        while let Some(current) = next {
            match self.store.list_override_keys(current, CREDENTIAL_KEY_PREFIX) {
                Ok(keys) => names.extend(
                    keys.iter()
                        .filter_map(|k| k.strip_prefix(CREDENTIAL_KEY_PREFIX))
                        .map(str::to_string),
                ),
                Err(e) => log::warn!(
                    "Could not list credentials of {} '{}': {}",
                    current.level,
                    current.id,
                    e
                ),
            }
            next = match self.store.describe(current) {
                Ok((_, parent)) => parent,
                Err(e) => {
                    log::warn!(
                        "Could not reach the parent of {} '{}': {}",
                        current.level,
                        current.id,
                        e
                    );
                    None
                }
            };
        }

        names
            .into_iter()
            .map(|name| {
                let resolved = self.resolve_credential(scope, &name);
                (name, resolved)
            })
            .collect()
    }

    /// Consults the override at every level from `start` up to the ecosystem,
    /// stopping at the first hit. A level whose entity cannot be read is
    /// recorded as failed and ends the hierarchy part of the walk.
    fn walk_hierarchy(&self, cascade: &mut Cascade<'_>, start: ScopeRef, key: &str) {
        let mut next = Some(start);
        while let Some(scope) = next {
            if cascade.is_settled() {
                break;
            }
            let level = CascadeLevel::Entity(scope.level);
            match self.store.describe(scope) {
                Ok((name, parent)) => {
                    cascade.consult(Layer::inherit(level, name), || {
                        self.store.get_override(scope, key)
                    });
                    next = parent;
                }
                Err(e) => {
                    cascade.fail(Layer::inherit(level, format!("#{}", scope.id)), e);
                    next = None;
                }
            }
        }
    }
}
