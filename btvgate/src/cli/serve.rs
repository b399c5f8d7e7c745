use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};

use crate::channel::{ChannelPolicy, PasscodeGate, ProtectedChannels};
use crate::config::{CookiePolicy, GatewaySettings};
use crate::server::AppState;

#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value = "8098")]
    pub port: u16,

    /// Passcode that unlocks protected channels
    #[arg(long, env = "CHANNEL_PASSCODE", hide_env_values = true)]
    pub passcode: Option<String>,

    /// Unlock cookie lifetime in hours
    #[arg(long, env = "COOKIE_TTL_HOURS", default_value = "12")]
    pub cookie_ttl_hours: u64,

    /// Mark unlock cookies Secure (HTTPS only)
    #[arg(long, env = "COOKIE_SECURE")]
    pub cookie_secure: bool,

    #[command(flatten)]
    pub gateway: GatewaySettings,
}

impl ServeCommand {
    pub async fn run(self) -> Result<()> {
        // Shutdown signal
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let policy = ChannelPolicy::embedded()?;
        let protected = ProtectedChannels::from_policy(&policy);
        info!(channels = ?protected.list(), "Loaded protected channel policy");

        let passcodes = PasscodeGate::new(self.passcode.clone());
        if !passcodes.is_configured() {
            warn!("CHANNEL_PASSCODE is not set; protected channels cannot be unlocked");
        }

        let storage_root = self.gateway.storage_root();
        if storage_root.is_empty() {
            warn!("SUPABASE_URL is not set; standby URLs will not be reachable");
        }

        let gateway = crate::gateway::shared(&self.gateway);
        if let Err(e) = &gateway {
            warn!(error = %e, "Remote store unavailable; data routes will fail");
        }

        let cookies = CookiePolicy {
            ttl: Duration::from_secs(self.cookie_ttl_hours.saturating_mul(60 * 60)),
            secure: self.cookie_secure,
        };

        let state = AppState::new(protected, passcodes, gateway, storage_root, cookies);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let server_handle = tokio::spawn(async move {
            if let Err(e) = crate::server::run_server(addr, state, shutdown_rx).await {
                error!(error = %e, "Server error");
            }
        });

        // Wait for Ctrl+C
        signal::ctrl_c().await?;
        info!("Shutting down");
        let _ = shutdown_tx.send(true);
        let _ = server_handle.await;

        info!("Done");
        Ok(())
    }
}
