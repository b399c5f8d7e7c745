use anyhow::Result;
use clap::Parser;

use crate::channel::{ChannelPolicy, ProtectedChannels};

#[derive(Parser, Debug)]
pub struct ProtectedCommand {
    /// Check a single channel instead of listing all
    pub channel: Option<String>,
}

impl ProtectedCommand {
    pub fn run(self) -> Result<()> {
        let protected = ProtectedChannels::from_policy(&ChannelPolicy::embedded()?);

        match self.channel {
            Some(channel) => {
                let verdict = if protected.is_protected(&channel) {
                    "protected"
                } else {
                    "open"
                };
                println!("{}: {}", channel.trim(), verdict);
            }
            None => {
                println!("Protected channels:");
                for channel in protected.list() {
                    println!("  - {}", channel);
                }
            }
        }
        Ok(())
    }
}
