use clap::Parser;

pub mod dispatcher;
pub mod handlers;
pub mod session;

/// ANSI codes for the semantic tags used in `cli.help.template`.
const HELP_TAGS: [(&str, &str); 6] = [
    ("title", "\x1b[1;33m"),
    ("hl", "\x1b[1;36m"),
    ("cmd", "\x1b[36m"),
    ("group", "\x1b[1;32m"),
    ("err", "\x1b[91m"),
    ("dim", "\x1b[2m"),
];

/// Renders the help template, colored only when the terminal allows it.
fn build_help_string() -> &'static str {
    let colorize = colored::control::SHOULD_COLORIZE.should_colorize();
    let reset = if colorize { "\x1b[0m" } else { "" };

    let rendered = HELP_TAGS
        .iter()
        .copied()
        .fold(t!("cli.help.template").to_string(), |text, (tag, code)| {
            text.replace(&format!("<{tag}>"), if colorize { code } else { "" })
                .replace(&format!("</{tag}>"), reset)
        });

    Box::leak(rendered.into_boxed_str())
}

/// devtree: hierarchical resolution and cascading settings for development environments.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command followed by its own arguments. Each handler parses the rest.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
