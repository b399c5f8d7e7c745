//! Runtime configuration.
//!
//! Everything comes from CLI flags with environment variable fallbacks.
//! Missing remote-store settings are not fatal at startup; they surface as
//! configuration errors from the operations that need them.

use clap::Args;

use crate::channel::StorageRoot;

/// Connection settings for the hosted backend.
#[derive(Args, Debug, Clone, Default)]
pub struct GatewaySettings {
    /// Project base URL, e.g. https://<project>.supabase.co
    #[arg(long = "supabase-url", env = "SUPABASE_URL")]
    pub url: Option<String>,

    /// Public (anon) API key used for reads
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Service-role key used for writes and signed URLs; never sent to browsers
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_role_key: Option<String>,
}

impl GatewaySettings {
    pub fn storage_root(&self) -> StorageRoot {
        StorageRoot::new(self.url.as_deref().unwrap_or_default())
    }
}

/// Settings for the unlock cookie written after a correct passcode.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub ttl: std::time::Duration,
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            ttl: crate::channel::proof::PROOF_TTL,
            secure: false,
        }
    }
}
