use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::{
    cli::{handlers::commons, session::Session},
    models::Level,
};

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Deletes an entity together with everything below it."
)]
struct DeleteArgs {
    /// Level of the entity to delete.
    level: Level,

    /// Path of the entity, e.g. `healthcare/backend`. Defaults to the active selection.
    path: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let delete_args = DeleteArgs::try_parse_from(&args)?;
    let scope = commons::resolve_scope(session, delete_args.path.as_deref(), Some(delete_args.level))?;
    let full_path = commons::display_path(&session.store, scope)?;

    // The entity itself is part of the set.
    let descendants = session.store.descendants_of(scope).len().saturating_sub(1);

    println!("\n{}", t!("delete.warning.header").red().bold());
    println!(
        "  - {}",
        format_args!(
            t!("delete.summary.target"),
            level = scope.level,
            path = full_path.cyan()
        )
    );
    if descendants > 0 {
        println!(
            "  - {}",
            format_args!(t!("delete.summary.descendants"), count = descendants)
        );
    }

    if !delete_args.yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("delete.prompt.are_you_sure"))
            .default(false)
            .interact()?
    {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(());
    }

    let removed = session.store.delete_recursive(scope)?;
    log::info!("Deleted '{}' and {} descendant(s).", full_path, removed.saturating_sub(1));
    println!(
        "\n{} {}",
        t!("common.success").green(),
        format_args!(t!("delete.success"), count = removed)
    );
    Ok(())
}
