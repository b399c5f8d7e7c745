use anyhow::Result;
use clap::Parser;

use super::StoreArgs;

#[derive(Parser, Debug)]
pub struct LocalCommand {
    #[command(flatten)]
    pub store: StoreArgs,
}

impl LocalCommand {
    pub fn run(self) -> Result<()> {
        let state = self.store.open()?;
        println!("Local store: {}", self.store.store.display());
        println!(
            "  progress entries: {}",
            state.list_in_progress_video_ids().len()
        );
        println!("  favorites:        {}", state.favorite_ids().len());
        println!(
            "  admin token:      {}",
            if state.admin_token_present() { "present" } else { "absent" }
        );
        Ok(())
    }
}
