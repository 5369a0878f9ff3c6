// src/cli/handlers/commons.rs

// Shared argument groups and helpers used by several handlers.

use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use colored::Colorize;

use crate::{
    cli::session::Session,
    constants::PATH_SEPARATOR,
    core::{
        entity_resolver::{AmbiguousError, EntityResolver, ResolveError},
        filter::ResolutionFilter,
        store::HierarchyStore,
    },
    models::{Level, ResolutionTrace, ResolvedPath, ScopeRef},
};

/// Name filter flags. Every flag left out matches any name.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Ecosystem name.
    #[arg(long, short = 'e')]
    pub ecosystem: Option<String>,
    /// Domain name.
    #[arg(long, short = 'd')]
    pub domain: Option<String>,
    /// App name.
    #[arg(long, short = 'a')]
    pub app: Option<String>,
    /// Workspace name.
    #[arg(long, short = 'w')]
    pub workspace: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ResolutionFilter {
        ResolutionFilter::new(
            self.ecosystem.clone(),
            self.domain.clone(),
            self.app.clone(),
            self.workspace.clone(),
        )
    }
}

/// Selects the entity an override is written to.
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Entity path, e.g. `healthcare/backend`. Its depth gives the level.
    #[arg(long)]
    pub at: Option<String>,
    /// Level of the active selection to use when `--at` is omitted.
    #[arg(long, short = 'l')]
    pub level: Option<Level>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Resolves the workspace a command should act on: the filter when one is
/// given, the active selection otherwise.
pub fn resolve_workspace(session: &Session, filter_args: &FilterArgs) -> Result<ResolvedPath> {
    let filter = filter_args.to_filter();
    if filter.is_empty() {
        return active_path(session);
    }
    Ok(EntityResolver::new(&session.store).resolve(&filter)?)
}

/// The full path of the active selection.
pub fn active_path(session: &Session) -> Result<ResolvedPath> {
    session
        .context
        .current_path(&session.store)?
        .ok_or_else(|| anyhow!(t!("error.no_active_context")))
}

/// Resolves an entity from an explicit path, or from the active selection.
///
/// With both a path and a level, the path must point at that level.
pub fn resolve_scope(session: &Session, path: Option<&str>, level: Option<Level>) -> Result<ScopeRef> {
    match path {
        Some(path) => {
            let scope = find_scope_by_path(&session.store, path)?;
            if let Some(expected) = level
                && expected != scope.level
            {
                return Err(anyhow!(
                    t!("error.path_level_mismatch"),
                    path = path,
                    expected = expected,
                    actual = scope.level
                ));
            }
            Ok(scope)
        }
        None => {
            let active = active_path(session)?;
            Ok(active.scope_at(level.unwrap_or(Level::Workspace)))
        }
    }
}

/// Looks up an entity by its slash-separated names, root first.
pub fn find_scope_by_path<S: HierarchyStore + ?Sized>(store: &S, path: &str) -> Result<ScopeRef> {
    let names: Vec<&str> = path
        .split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    let not_found = || anyhow!(t!("error.path_not_found"), path = path);

    let mut names = names.into_iter();
    let first = names.next().ok_or_else(not_found)?;
    let ecosystem = store.find_ecosystem_by_name(first)?.ok_or_else(not_found)?;
    let mut scope = ScopeRef::new(Level::Ecosystem, ecosystem.id);

    for name in names {
        scope = match scope.level {
            Level::Ecosystem => {
                let domain = store.find_domain_by_name(scope.id, name)?.ok_or_else(not_found)?;
                ScopeRef::new(Level::Domain, domain.id)
            }
            Level::Domain => {
                let app = store.find_app_by_name(scope.id, name)?.ok_or_else(not_found)?;
                ScopeRef::new(Level::App, app.id)
            }
            Level::App => {
                let ws = store.find_workspace_by_name(scope.id, name)?.ok_or_else(not_found)?;
                ScopeRef::new(Level::Workspace, ws.id)
            }
            Level::Workspace => return Err(anyhow!(t!("error.path_too_deep"), path = path)),
        };
    }
    Ok(scope)
}

/// Slash-joined names from the ecosystem down to `scope`.
pub fn display_path<S: HierarchyStore + ?Sized>(store: &S, scope: ScopeRef) -> Result<String> {
    let mut names = Vec::new();
    let mut next = Some(scope);
    while let Some(current) = next {
        let (name, parent) = store.describe(current)?;
        names.push(name);
        next = parent;
    }
    names.reverse();
    Ok(names.join(PATH_SEPARATOR))
}

/// Prints a cascade trace, one line per consulted layer.
pub fn print_trace(trace: &ResolutionTrace) {
    for step in &trace.steps {
        let value = match (&step.value, &step.error) {
            (_, Some(error)) => error.red().to_string(),
            (Some(value), None) => value.green().to_string(),
            (None, None) => "-".dimmed().to_string(),
        };
        let marker = if step.found { "✔".green() } else { " ".normal() };
        println!(
            "    {} {:<12} {:<20} {}",
            marker,
            step.level.to_string().blue(),
            step.entity_name,
            value
        );
    }
}

/// Hides a secret, keeping only its length class.
pub fn mask(value: &str) -> String {
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        "********".to_string()
    }
}

/// Prints guidance for an ambiguous or unmatched filter.
///
/// # Returns
/// `true` if `err` was a resolution error and has been reported.
pub fn report_resolution_error(err: &anyhow::Error) -> bool {
    if let Some(ambiguous) = find_ambiguity(err) {
        eprintln!("\n{}: {}", t!("common.ambiguous").yellow().bold(), ambiguous);
        eprint!("{}", ambiguous.format_disambiguation());
        eprintln!("\n{}", t!("hint.refine_filter").dimmed());
        return true;
    }
    if crate::core::entity_resolver::is_not_found_error(err) {
        eprintln!("\n{}: {}", t!("common.not_found").yellow().bold(), err);
        eprintln!("{}", t!("hint.use_list").dimmed());
        return true;
    }
    false
}

fn find_ambiguity(err: &anyhow::Error) -> Option<&AmbiguousError> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<AmbiguousError>()
            .or_else(|| match cause.downcast_ref::<ResolveError>() {
                Some(ResolveError::Ambiguous(ambiguous)) => Some(ambiguous),
                _ => None,
            })
    })
}
