use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Select, theme::ColorfulTheme};

use crate::{
    cli::{handlers::commons::FilterArgs, session::Session},
    core::entity_resolver::{AmbiguousError, EntityResolver, Resolution, ResolveError},
    models::ResolvedPath,
};

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Selects the workspace later commands act on."
)]
struct UseArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Choose interactively when several workspaces match.
    #[arg(long)]
    pick: bool,

    /// Clear the active selection.
    #[arg(long, conflicts_with_all = ["pick", "ecosystem", "domain", "app", "workspace"])]
    clear: bool,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let use_args = UseArgs::try_parse_from(&args)?;

    if use_args.clear {
        session.context.clear(&mut session.store);
        println!("\n{} {}", t!("common.success").green(), t!("use.cleared"));
        return Ok(());
    }

    let filter = use_args.filter.to_filter();
    let resolution = EntityResolver::new(&session.store).evaluate(&filter)?;
    let path = match resolution {
        Resolution::Found(path) => path,
        Resolution::NotFound => return Err(ResolveError::NotFound { filter }.into()),
        Resolution::Ambiguous(candidates) if use_args.pick => pick(candidates)?,
        Resolution::Ambiguous(candidates) => {
            return Err(ResolveError::from(AmbiguousError {
                filter,
                candidates: candidates.iter().map(ResolvedPath::full_path).collect(),
            })
            .into());
        }
    };

    session.context.apply(&mut session.store, &path);
    println!(
        "\n{} {}",
        t!("common.success").green(),
        format_args!(t!("use.selected"), path = path.full_path().cyan())
    );
    Ok(())
}

/// Lets the user choose among ambiguous candidates.
fn pick(mut candidates: Vec<ResolvedPath>) -> Result<ResolvedPath> {
    let items: Vec<String> = candidates.iter().map(ResolvedPath::full_path).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("use.prompt.pick"))
        .items(&items)
        .default(0)
        .interact_opt()?;

    match selection {
        Some(i) if i < candidates.len() => Ok(candidates.swap_remove(i)),
        _ => Err(anyhow!(t!("common.info.operation_cancelled"))),
    }
}
