use anyhow::{Result, anyhow};

use crate::cli::{handlers, session::Session};

// --- Command Definition and Registry ---

/// Defines a system command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut Session) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "create",
        aliases: &["new", "add"],
        handler: handlers::create::handle,
    },
    CommandDefinition {
        name: "credential",
        aliases: &["cred"],
        handler: handlers::credential::handle,
    },
    CommandDefinition {
        name: "delete",
        aliases: &["del", "rm"],
        handler: handlers::delete::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "show",
        aliases: &["get", "info"],
        handler: handlers::show::handle,
    },
    CommandDefinition {
        name: "theme",
        aliases: &[],
        handler: handlers::theme::handle,
    },
    CommandDefinition {
        name: "tree",
        aliases: &[],
        handler: handlers::tree::handle,
    },
    CommandDefinition {
        name: "use",
        aliases: &["switch"],
        handler: handlers::use_context::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Runs `devtree <command> [args...]`: opens the session, runs the handler
/// and saves whatever it changed.
pub fn dispatch(all_args: Vec<String>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let Some((name, rest)) = all_args.split_first() else {
        println!("{}", t!("cli.no_command"));
        return Ok(());
    };

    let command = find_command(name)
        .ok_or_else(|| anyhow!(t!("error.unknown_command"), name = name))?;

    let mut session = Session::open()?;
    (command.handler)(rest.to_vec(), &mut session)?;
    session.save()
}
