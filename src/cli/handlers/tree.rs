use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::{handlers::commons, session::Session},
    core::graph_display,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Displays the hierarchy as a tree."
)]
struct TreeArgs {
    /// Entity to use as the root of the tree, e.g. `healthcare/backend`. Defaults to the full tree.
    path: Option<String>,
}

pub fn handle(args: Vec<String>, session: &mut Session) -> Result<()> {
    let tree_args = TreeArgs::try_parse_from(&args)?;

    let (start, header) = match tree_args.path.as_deref() {
        Some(path) => {
            let scope = commons::find_scope_by_path(&session.store, path)?;
            let name = commons::display_path(&session.store, scope)?;
            (
                Some(scope),
                format!(t!("tree.header.from_entity"), name = name.cyan()),
            )
        }
        None => (None, t!("tree.header.full_tree").to_string()),
    };

    let rendered = graph_display::render_tree(session.store.index(), start, &session.context)
        .ok_or_else(|| anyhow!(t!("error.entity_vanished")))?;

    if rendered.is_empty() {
        println!("\n{}", t!("tree.empty"));
        return Ok(());
    }

    println!("\n{}", header);
    print!("{}", rendered);
    if !session.context.is_empty() {
        println!("\n{}", t!("tree.legend.active").dimmed());
    }
    Ok(())
}
