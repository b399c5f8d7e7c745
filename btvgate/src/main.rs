use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod channel;
mod cli;
mod config;
mod gateway;
mod server;
mod util;
mod watch;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("btvgate=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::Args::parse().run().await
}
