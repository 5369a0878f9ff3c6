use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    cli::{
        handlers::commons::{self, FilterArgs, OutputFormat, TargetArgs},
        session::Session,
    },
    constants::THEME_KEY,
    core::setting_resolver::CascadeResolver,
    models::Level,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manages theme overrides.")]
struct ThemeArgs {
    #[command(subcommand)]
    action: ThemeAction,
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Sets the theme at an entity. Everything below it inherits it.
    Set {
        theme: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Removes the theme override at an entity.
    Unset {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Shows the effective theme of a workspace and where it comes from.
    Show {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format.
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let theme_args = ThemeArgs::try_parse_from(&args)?;

    match theme_args.action {
        ThemeAction::Set { theme, target } => {
            let theme = theme.trim();
            if theme.is_empty() {
                return Err(anyhow!(t!("theme.error.empty")));
            }
            let scope = commons::resolve_scope(session, target.at.as_deref(), target.level)?;
            session.store.set_override(scope, THEME_KEY, theme)?;
            let path = commons::display_path(&session.store, scope)?;
            println!(
                "\n{} {}",
                t!("common.success").green(),
                format_args!(t!("theme.set"), theme = theme.cyan(), path = path)
            );
        }
        ThemeAction::Unset { target } => {
            let scope = commons::resolve_scope(session, target.at.as_deref(), target.level)?;
            let path = commons::display_path(&session.store, scope)?;
            if session.store.remove_override(scope, THEME_KEY) {
                println!(
                    "\n{} {}",
                    t!("common.success").green(),
                    format_args!(t!("theme.unset"), path = path)
                );
            } else {
                println!("\n{}", format_args!(t!("theme.unset_none"), path = path));
            }
        }
        ThemeAction::Show { filter, output } => {
            let path = commons::resolve_workspace(session, &filter)?;
            let resolved = CascadeResolver::new(&session.store, &session.config)
                .resolve_theme(path.scope_at(Level::Workspace));

            if output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
                return Ok(());
            }

            println!("\n--- {} '{}' ---", t!("theme.header"), path.full_path().yellow());
            println!(
                "  {} {}",
                resolved.value.as_deref().unwrap_or("-").cyan().bold(),
                format_args!(
                    t!("common.from_source"),
                    level = resolved
                        .source
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    name = resolved.source_name.as_deref().unwrap_or("-")
                )
            );
            println!("\n  {}", t!("common.trace_header").dimmed());
            commons::print_trace(&resolved.trace);
        }
    }
    Ok(())
}
