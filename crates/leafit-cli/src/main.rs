use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use leafit::EditorConfig;
use tracing::debug;

use crate::commands::CheckKind;

mod commands;
mod logging;

#[derive(Debug, Parser)]
#[command(name = "leafit", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the node tree of a JSON document.
    Describe {
        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Apply an edit script to a JSON document and print the result.
    Edit {
        /// JSON file holding a list of operations.
        #[arg(long)]
        ops: PathBuf,
        /// Editor config, TOML when the extension is `.toml`, JSON otherwise.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the edited node tree instead of the document.
        #[arg(long)]
        tree: bool,
        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Check text the way the inline editor validates it.
    Check {
        #[arg(value_enum)]
        kind: CheckKind,
        text: String,
    },
    /// Print the structural hash of a JSON document's tree.
    Hash {
        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Cli::parse();
    debug!(command = ?cli.command);

    let output = match cli.command {
        Command::Describe { file } => commands::describe(&read_input(file.as_deref())?)?,
        Command::Edit {
            ops,
            config,
            tree,
            file,
        } => {
            let script =
                std::fs::read_to_string(&ops).with_context(|| format!("failed to read script `{}`", ops.display()))?;
            let config = match config {
                Some(path) => commands::load_config(&path)?,
                None => EditorConfig::default(),
            };
            commands::edit(&read_input(file.as_deref())?, &script, config, tree)?
        }
        Command::Check { kind, text } => commands::check(kind, &text)?,
        Command::Hash { file } => commands::hash(&read_input(file.as_deref())?)?,
    };

    println!("{output}");
    Ok(())
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read file `{}`", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
