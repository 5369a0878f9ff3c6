use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::{
        handlers::commons::{FilterArgs, OutputFormat},
        session::Session,
    },
    core::entity_resolver::EntityResolver,
    models::{Level, ResolvedPath},
};

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Lists every workspace matching a filter."
)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t)]
    output: OutputFormat,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let filter = list_args.filter.to_filter();

    let matches = match EntityResolver::new(&session.store).resolve_all(&filter) {
        Ok(matches) => matches,
        // An empty store is not an error when nothing was asked for.
        Err(e) if e.is_not_found() && filter.is_empty() => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if list_args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("\n{}", t!("list.empty"));
        return Ok(());
    }

    println!(
        "\n{}",
        format!(t!("list.header"), count = matches.len(), filter = filter).bold()
    );
    for path in &matches {
        print_row(session, path);
    }
    Ok(())
}

fn print_row(session: &Session, path: &ResolvedPath) {
    let is_active = session
        .context
        .contains(path.scope_at(Level::Workspace));
    let marker = if is_active { "*".green().bold() } else { " ".normal() };
    let image = path.workspace.image.as_deref().unwrap_or("-");
    println!(
        "  {} {:<48} {:<10} {}",
        marker,
        path.full_path(),
        path.workspace.status.to_string().yellow(),
        image.dimmed()
    );
}
