use anyhow::Result;
use clap::Parser;
use colored::*;
use serde::Serialize;

use crate::{
    cli::{
        handlers::commons::{self, FilterArgs, OutputFormat},
        session::Session,
    },
    core::setting_resolver::CascadeResolver,
    models::{Level, ResolvedPath},
};

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Shows a workspace with its full ancestor chain."
)]
struct ShowArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Serialize, Debug)]
struct ShowReport<'a> {
    full_path: String,
    active: bool,
    theme: Option<String>,
    #[serde(flatten)]
    path: &'a ResolvedPath,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let show_args = ShowArgs::try_parse_from(&args)?;
    let path = commons::resolve_workspace(session, &show_args.filter)?;

    let workspace_scope = path.scope_at(Level::Workspace);
    let theme = CascadeResolver::new(&session.store, &session.config).resolve_theme(workspace_scope);
    let report = ShowReport {
        full_path: path.full_path(),
        active: session.context.contains(workspace_scope),
        theme: theme.value,
        path: &path,
    };

    if show_args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let active = if report.active {
        format!(" {}", t!("show.label.active").green())
    } else {
        String::new()
    };
    println!("\n--- {}{} ---", report.full_path.yellow(), active);
    println!(
        "  {:<12} {} {}",
        t!("show.label.ecosystem").blue(),
        path.ecosystem.name,
        format!("#{}", path.ecosystem.id).dimmed()
    );
    println!(
        "  {:<12} {} {}",
        t!("show.label.domain").blue(),
        path.domain.name,
        format!("#{}", path.domain.id).dimmed()
    );
    println!(
        "  {:<12} {} {}",
        t!("show.label.app").blue(),
        path.app.name,
        format!("#{}", path.app.id).dimmed()
    );
    println!("  {:<12} {}", t!("show.label.source").blue(), path.app.path.display());
    println!(
        "  {:<12} {} {}",
        t!("show.label.workspace").blue(),
        path.workspace.name,
        format!("#{}", path.workspace.id).dimmed()
    );
    println!("  {:<12} {}", t!("show.label.status").blue(), path.workspace.status);
    println!(
        "  {:<12} {}",
        t!("show.label.image").blue(),
        path.workspace.image.as_deref().unwrap_or("-")
    );
    println!(
        "  {:<12} {}",
        t!("show.label.theme").blue(),
        report.theme.as_deref().unwrap_or("-")
    );
    Ok(())
}
