use anyhow::{Context, bail};
use clap::Parser;
use foldersort::cli::{self, OrganizeCommand, OutputMode, run_cli_with_config};
use std::io;
use std::path::PathBuf;

/// Sort the files of a folder into category subfolders.
#[derive(Debug, Parser)]
#[command(name = "foldersort", version, about)]
struct Args {
    /// Folder to organize (prompted for when omitted)
    path: Option<PathBuf>,

    /// Move files without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Only show what would be moved
    #[arg(long)]
    dry_run: bool,

    /// Print the preview or result as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to .foldersortrc.toml, then ~/.config/foldersort/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let dir_path = match args.path {
        Some(path) => path,
        None => {
            let stdin = io::stdin();
            match cli::prompt_folder(&mut stdin.lock()) {
                Some(path) => PathBuf::from(path),
                None => bail!("No folder given"),
            }
        }
    };

    let command = if args.dry_run {
        OrganizeCommand::Preview
    } else {
        OrganizeCommand::Organize {
            assume_yes: args.yes,
        }
    };
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    run_cli_with_config(command, &dir_path, args.config.as_deref(), mode)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Could not organize {}", dir_path.display()))
}
