use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

use crate::{
    cli::{handlers::commons, session::Session},
    core::{naming, paths},
    models::{Level, ScopeRef},
};

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Creates an ecosystem, domain, app or workspace."
)]
struct CreateArgs {
    /// What to create: ecosystem, domain, app or workspace.
    level: Level,

    /// Name of the new entity. Unique among its siblings.
    name: String,

    /// Path of the parent, e.g. `healthcare/backend`. Defaults to the active selection.
    #[arg(long = "in", value_name = "PARENT")]
    parent: Option<String>,

    /// Source directory of a new app. Defaults to the current directory.
    #[arg(long)]
    path: Option<PathBuf>,

    /// Container image of a new workspace.
    #[arg(long)]
    image: Option<String>,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let create_args = CreateArgs::try_parse_from(&args)?;
    let name = naming::validate_entity_name(&create_args.name)?;

    if create_args.path.is_some() && create_args.level != Level::App {
        return Err(anyhow!(t!("create.error.path_only_for_apps")));
    }
    if create_args.image.is_some() && create_args.level != Level::Workspace {
        return Err(anyhow!(t!("create.error.image_only_for_workspaces")));
    }

    let created = match create_args.level.parent() {
        None => {
            if create_args.parent.is_some() {
                return Err(anyhow!(t!("create.error.ecosystem_has_no_parent")));
            }
            let ecosystem = session.store.create_ecosystem(&name)?;
            ScopeRef::new(Level::Ecosystem, ecosystem.id)
        }
        Some(parent_level) => {
            let parent =
                commons::resolve_scope(session, create_args.parent.as_deref(), Some(parent_level))
                    .with_context(|| {
                        format!(t!("create.error.parent_required"), level = parent_level)
                    })?;
            create_child(session, parent, &name, create_args.path, create_args.image)?
        }
    };

    let full_path = commons::display_path(&session.store, created)?;
    log::info!("Created {} '{}' (#{}).", created.level, full_path, created.id);
    println!(
        "\n{} {}",
        t!("common.success").green(),
        format_args!(
            t!("create.success"),
            level = created.level,
            path = full_path.cyan()
        )
    );
    Ok(())
}

fn create_child(
    session: &mut Session,
    parent: ScopeRef,
    name: &str,
    path: Option<PathBuf>,
    image: Option<String>,
) -> Result<ScopeRef> {
    let store = &mut session.store;
    let scope = match parent.level {
        Level::Ecosystem => {
            let domain = store.create_domain(parent.id, name)?;
            ScopeRef::new(Level::Domain, domain.id)
        }
        Level::Domain => {
            let source = match path {
                Some(path) => path,
                None => std::env::current_dir().context(t!("create.error.current_dir"))?,
            };
            let app = store.create_app(parent.id, name, paths::normalize_source_path(&source))?;
            ScopeRef::new(Level::App, app.id)
        }
        Level::App => {
            let workspace = store.create_workspace(parent.id, name, image)?;
            ScopeRef::new(Level::Workspace, workspace.id)
        }
        Level::Workspace => return Err(anyhow!(t!("create.error.workspace_has_no_children"))),
    };
    Ok(scope)
}
