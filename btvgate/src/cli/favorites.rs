use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::GatewaySettings;
use crate::watch::{FavoritesView, hydrate_favorites};

use super::StoreArgs;

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// List favorite program ids
    List(ListFavorites),
    /// Add a program to favorites
    Add(EditFavorite),
    /// Remove a program from favorites
    Remove(EditFavorite),
    /// Add a program if absent, remove it if present
    Toggle(EditFavorite),
    /// Fetch full program records for the favorites
    Hydrate(HydrateFavorites),
}

#[derive(Parser, Debug)]
pub struct ListFavorites {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct EditFavorite {
    /// Program id
    pub program: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct HydrateFavorites {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub gateway: GatewaySettings,
}

impl FavoritesCommand {
    pub async fn run(self) -> Result<()> {
        match self {
            FavoritesCommand::List(cmd) => {
                let ids = cmd.store.open()?.favorite_ids();
                if ids.is_empty() {
                    println!("{}", crate::watch::favorites::NO_FAVORITES_MESSAGE);
                }
                for id in ids {
                    println!("  - {}", id);
                }
            }
            FavoritesCommand::Add(cmd) => {
                let mut state = cmd.store.open()?;
                if state.add_favorite(&cmd.program)? {
                    println!("Added {}", cmd.program);
                } else {
                    println!("{} is already a favorite", cmd.program);
                }
            }
            FavoritesCommand::Remove(cmd) => {
                let mut state = cmd.store.open()?;
                if state.remove_favorite(&cmd.program)? {
                    println!("Removed {}", cmd.program);
                } else {
                    println!("{} was not a favorite", cmd.program);
                }
            }
            FavoritesCommand::Toggle(cmd) => {
                let mut state = cmd.store.open()?;
                let verdict = if state.toggle_favorite(&cmd.program)? {
                    "now a favorite"
                } else {
                    "no longer a favorite"
                };
                println!("{} is {}", cmd.program, verdict);
            }
            FavoritesCommand::Hydrate(cmd) => {
                let ids = cmd.store.open()?.favorite_ids();
                let view = if ids.is_empty() {
                    FavoritesView::Empty
                } else {
                    let gateway = crate::gateway::shared(&cmd.gateway)?;
                    hydrate_favorites(&gateway, &ids).await?
                };

                if let Some(message) = view.message() {
                    println!("{}", message);
                }
                for program in view.programs() {
                    println!(
                        "  {}  {}",
                        program.id,
                        program.title.as_deref().unwrap_or("(untitled)")
                    );
                }
            }
        }
        Ok(())
    }
}
