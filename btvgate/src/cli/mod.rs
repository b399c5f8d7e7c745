use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::watch::{FileStore, WatchState};

mod favorites;
mod local;
mod progress;
mod protected;
mod serve;
mod standby;

pub use favorites::FavoritesCommand;
pub use local::LocalCommand;
pub use progress::ProgressCommand;
pub use protected::ProtectedCommand;
pub use serve::ServeCommand;
pub use standby::StandbyUrlCommand;

#[derive(Parser, Debug)]
#[command(name = "btvgate")]
#[command(about = "Channel access gate and watch-state tools for the streaming site")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve(ServeCommand),
    /// List passcode-protected channels
    Protected(ProtectedCommand),
    /// Print the standby video URL for a channel
    StandbyUrl(StandbyUrlCommand),
    /// Inspect or edit local playback progress
    #[command(subcommand)]
    Progress(ProgressCommand),
    /// Inspect, edit or hydrate local favorites
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Summarize what the local store holds
    Local(LocalCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or_else(|| Command::Serve(ServeCommand::parse_from(["serve"])));

        match command {
            Command::Serve(cmd) => cmd.run().await,
            Command::Protected(cmd) => cmd.run(),
            Command::StandbyUrl(cmd) => cmd.run(),
            Command::Progress(cmd) => cmd.run(),
            Command::Favorites(cmd) => cmd.run().await,
            Command::Local(cmd) => cmd.run(),
        }
    }
}

/// Location of the on-disk local store.
#[derive(ClapArgs, Debug, Clone)]
pub struct StoreArgs {
    /// Local store file
    #[arg(long, env = "BTV_LOCAL_STORE", default_value = "btv-local.json")]
    pub store: PathBuf,
}

impl StoreArgs {
    pub fn open(&self) -> Result<WatchState<FileStore>> {
        Ok(WatchState::new(FileStore::open(&self.store)?))
    }
}
