// src/core/filter.rs

use crate::models::Level;
use serde::Serialize;
use std::fmt;

/// A partial specification of names across the hierarchy.
///
/// Each level is optional; an empty or absent name leaves that level unconstrained.
/// Matching is exact and case-sensitive.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionFilter {
    ecosystem: Option<String>,
    domain: Option<String>,
    app: Option<String>,
    workspace: Option<String>,
}

impl ResolutionFilter {
    pub fn new(
        ecosystem: Option<String>,
        domain: Option<String>,
        app: Option<String>,
        workspace: Option<String>,
    ) -> Self {
        Self {
            ecosystem: normalize(ecosystem),
            domain: normalize(domain),
            app: normalize(app),
            workspace: normalize(workspace),
        }
    }

    pub fn with_ecosystem(mut self, name: impl Into<String>) -> Self {
        self.ecosystem = normalize(Some(name.into()));
        self
    }

    pub fn with_domain(mut self, name: impl Into<String>) -> Self {
        self.domain = normalize(Some(name.into()));
        self
    }

    pub fn with_app(mut self, name: impl Into<String>) -> Self {
        self.app = normalize(Some(name.into()));
        self
    }

    pub fn with_workspace(mut self, name: impl Into<String>) -> Self {
        self.workspace = normalize(Some(name.into()));
        self
    }

    /// The required name at `level`, if any.
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Ecosystem => self.ecosystem.as_deref(),
            Level::Domain => self.domain.as_deref(),
            Level::App => self.app.as_deref(),
            Level::Workspace => self.workspace.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::MOST_SPECIFIC_FIRST
            .iter()
            .all(|level| self.get(*level).is_none())
    }

    /// `true` if an entity called `name` at `level` satisfies this filter.
    pub fn admits(&self, level: Level, name: &str) -> bool {
        self.get(level).is_none_or(|wanted| wanted == name)
    }
}

fn normalize(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

impl fmt::Display for ResolutionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<no filter>");
        }
        let parts: Vec<String> = [Level::Ecosystem, Level::Domain, Level::App, Level::Workspace]
            .iter()
            .filter_map(|level| self.get(*level).map(|name| format!("{}={}", level, name)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
