use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::collections::BTreeMap;

use crate::{
    cli::{
        handlers::commons::{self, FilterArgs, OutputFormat, TargetArgs},
        session::Session,
    },
    core::{
        naming,
        setting_resolver::{CascadeResolver, ResolvedSetting, credential_key},
    },
    models::Level,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manages credential overrides.")]
struct CredentialArgs {
    #[command(subcommand)]
    action: CredentialAction,
}

#[derive(Subcommand, Debug)]
enum CredentialAction {
    /// Sets a credential at an entity. Everything below it inherits it.
    Set {
        /// Credential name. The environment variable of the same name always wins.
        name: String,
        value: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Removes a credential override at an entity.
    Unset {
        name: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Shows the effective credentials of a workspace and where each comes from.
    Show {
        /// Show only this credential, with its full trace.
        name: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print values in clear text.
        #[arg(long)]
        reveal: bool,
        /// Output format.
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let credential_args = CredentialArgs::try_parse_from(&args)?;

    match credential_args.action {
        CredentialAction::Set {
            name,
            value,
            target,
        } => {
            let name = naming::validate_credential_name(&name)?;
            let scope = commons::resolve_scope(session, target.at.as_deref(), target.level)?;
            session.store.set_override(scope, &credential_key(&name), &value)?;
            let path = commons::display_path(&session.store, scope)?;
            println!(
                "\n{} {}",
                t!("common.success").green(),
                format_args!(t!("credential.set"), name = name.cyan(), path = path)
            );
        }
        CredentialAction::Unset { name, target } => {
            let scope = commons::resolve_scope(session, target.at.as_deref(), target.level)?;
            let path = commons::display_path(&session.store, scope)?;
            if session.store.remove_override(scope, &credential_key(&name)) {
                println!(
                    "\n{} {}",
                    t!("common.success").green(),
                    format_args!(t!("credential.unset"), name = name.cyan(), path = path)
                );
            } else {
                println!(
                    "\n{}",
                    format_args!(t!("credential.unset_none"), name = name, path = path)
                );
            }
        }
        CredentialAction::Show {
            name,
            filter,
            reveal,
            output,
        } => {
            let path = commons::resolve_workspace(session, &filter)?;
            let scope = path.scope_at(Level::Workspace);
            let resolver = CascadeResolver::new(&session.store, &session.config);

            let mut resolved: BTreeMap<String, ResolvedSetting> = match name {
                Some(name) => {
                    let name = naming::validate_credential_name(&name)?;
                    let setting = resolver.resolve_credential(scope, &name);
                    BTreeMap::from([(name, setting)])
                }
                None => resolver.resolve_credentials(scope),
            };
            if !reveal {
                resolved.values_mut().for_each(redact);
            }

            if output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
                return Ok(());
            }

            println!(
                "\n--- {} '{}' ---",
                t!("credential.header"),
                path.full_path().yellow()
            );
            if resolved.is_empty() {
                println!("  {}", t!("credential.none"));
                return Ok(());
            }
            let single = resolved.len() == 1;
            for (name, setting) in &resolved {
                print_credential(name, setting);
                if single {
                    println!("\n  {}", t!("common.trace_header").dimmed());
                    commons::print_trace(&setting.trace);
                }
            }
        }
    }
    Ok(())
}

fn print_credential(name: &str, setting: &ResolvedSetting) {
    let source = format!(
        t!("common.from_source"),
        level = setting
            .source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        name = setting.source_name.as_deref().unwrap_or("-")
    );
    println!(
        "  {:<24} {:<16} {}",
        name.blue(),
        setting.value.as_deref().unwrap_or("-").green(),
        source.dimmed()
    );
}

/// Masks every value carried by `setting`, including those in its trace.
fn redact(setting: &mut ResolvedSetting) {
    if let Some(value) = setting.value.as_mut() {
        *value = commons::mask(value);
    }
    for step in &mut setting.trace.steps {
        if let Some(value) = step.value.as_mut() {
            *value = commons::mask(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CascadeLevel, ResolutionTrace, TraceStep};

    #[test]
    fn test_redact_masks_value_and_trace() {
        let mut setting = ResolvedSetting {
            key: credential_key("API_KEY"),
            value: Some("sk-live-123456".into()),
            source: Some(CascadeLevel::Environment),
            source_name: Some("process environment".into()),
            trace: ResolutionTrace {
                steps: vec![TraceStep {
                    level: CascadeLevel::Environment,
                    entity_name: "process environment".into(),
                    found: true,
                    value: Some("sk-live-123456".into()),
                    error: None,
                }],
            },
        };
        redact(&mut setting);
        assert_eq!(setting.value.as_deref(), Some("********"));
        assert_eq!(setting.trace.steps[0].value.as_deref(), Some("********"));
    }
}
