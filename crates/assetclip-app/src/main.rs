//! AssetClip command-line entry point.

mod commands;

use assetclip_core::{ClipboardConfig, FileStorage};
use clap::{Parser, Subcommand};
use commands::{CopyArgs, PasteArgs, ReadArgs};
use std::path::PathBuf;
use std::sync::Arc;

/// AssetClip - copy and paste document fragments with their assets
#[derive(Parser, Debug)]
#[command(name = "assetclip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (field names, slot key)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the clipboard slot (defaults to the user data dir)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy a JSON fragment to the clipboard
    Copy(CopyArgs),

    /// Paste the clipboard into a JSON target file
    Paste(PasteArgs),

    /// Print the clipboard contents for a type
    Read(ReadArgs),

    /// Show the type currently on the clipboard
    Status,

    /// Empty the clipboard
    Clear,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClipboardConfig::load(path)?,
        None => ClipboardConfig::default(),
    };
    let storage = match cli.store_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    log::debug!("Using clipboard store at {}", storage.base_path().display());
    let clipboard = commands::open(Arc::new(storage), config);

    pollster::block_on(async {
        match cli.command {
            Command::Copy(args) => commands::copy(&clipboard, args).await,
            Command::Paste(args) => commands::paste(&clipboard, args).await,
            Command::Read(args) => commands::read(&clipboard, args).await,
            Command::Status => commands::status(&clipboard).await,
            Command::Clear => Ok(clipboard.clear().await?),
        }
    })
}
