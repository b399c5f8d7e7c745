use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::util::time::{format_millis, now_millis, parse_millis};
use crate::watch::ProgressPayload;

use super::StoreArgs;

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    /// List videos with saved progress, most recent first
    List(ListProgress),
    /// Show saved progress for one video
    Get(GetProgress),
    /// Record progress for one video, replacing any existing entry
    Set(SetProgress),
    /// Remove all saved progress
    Clear(ClearProgress),
}

#[derive(Parser, Debug)]
pub struct ListProgress {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct GetProgress {
    /// Video source id
    pub video: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct SetProgress {
    /// Video source id
    pub video: String,

    /// Playback position in seconds
    #[arg(long)]
    pub position: f64,

    /// Video length in seconds
    #[arg(long)]
    pub duration: f64,

    /// When the position was reached (RFC 3339 or epoch); defaults to now
    #[arg(long)]
    pub at: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct ClearProgress {
    #[command(flatten)]
    pub store: StoreArgs,
}

impl ProgressCommand {
    pub fn run(self) -> Result<()> {
        match self {
            ProgressCommand::List(cmd) => {
                let state = cmd.store.open()?;
                let entries = state.continue_watching();
                if entries.is_empty() {
                    println!("No saved progress");
                }
                for (video, progress) in entries {
                    println!(
                        "  {}  {:>5.1}%  {:.0}s / {:.0}s  ({})",
                        video,
                        progress.fraction() * 100.0,
                        progress.position,
                        progress.duration,
                        format_millis(progress.timestamp)
                    );
                }
            }
            ProgressCommand::Get(cmd) => {
                let state = cmd.store.open()?;
                match state.get_progress(&cmd.video) {
                    Some(progress) => println!("{}", serde_json::to_string_pretty(&progress)?),
                    None => println!("No saved progress for {}", cmd.video),
                }
            }
            ProgressCommand::Set(cmd) => {
                if !(cmd.position >= 0.0 && cmd.duration >= 0.0) {
                    return Err(anyhow!("Position and duration must be non-negative"));
                }
                let timestamp = match cmd.at.as_deref() {
                    Some(raw) => {
                        parse_millis(raw).ok_or_else(|| anyhow!("Unrecognised time '{}'", raw))?
                    }
                    None => now_millis(),
                };
                let mut state = cmd.store.open()?;
                state.set_progress(
                    &cmd.video,
                    &ProgressPayload {
                        position: cmd.position,
                        duration: cmd.duration,
                        timestamp,
                    },
                )?;
                println!("Saved progress for {}", cmd.video);
            }
            ProgressCommand::Clear(cmd) => {
                let mut state = cmd.store.open()?;
                let removed = state.clear_progress()?;
                let noun = if removed == 1 { "entry" } else { "entries" };
                println!("Removed {} progress {}", removed, noun);
            }
        }
        Ok(())
    }
}
