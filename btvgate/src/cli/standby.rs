use anyhow::{Result, anyhow};
use clap::Parser;

use crate::channel::{ChannelKey, StorageRoot, standby_url_for};

#[derive(Parser, Debug)]
pub struct StandbyUrlCommand {
    /// Numeric channel id
    pub channel: String,

    /// Project base URL
    #[arg(long, env = "SUPABASE_URL", default_value = "")]
    pub root: String,
}

impl StandbyUrlCommand {
    pub fn run(self) -> Result<()> {
        let id = ChannelKey::new(&self.channel)
            .as_number()
            .ok_or_else(|| anyhow!("Channel id '{}' is not numeric", self.channel))?;
        println!("{}", standby_url_for(&StorageRoot::new(&self.root), id));
        Ok(())
    }
}
