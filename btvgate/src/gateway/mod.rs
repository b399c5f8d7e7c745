pub mod client;
pub mod error;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::config::GatewaySettings;

pub use client::{DEFAULT_SIGNED_URL_TTL, RemoteStore};
pub use error::{GatewayError, GatewayResult};

static SHARED: OnceLock<Arc<RemoteStore>> = OnceLock::new();
static INSTANCES: AtomicUsize = AtomicUsize::new(0);

/**
    The process-wide remote store client, created on first use.

    Later calls return the same instance and ignore their settings.
*/
pub fn shared(settings: &GatewaySettings) -> GatewayResult<Arc<RemoteStore>> {
    if let Some(store) = SHARED.get() {
        return Ok(Arc::clone(store));
    }
    let store = Arc::new(RemoteStore::new(settings)?);
    Ok(Arc::clone(SHARED.get_or_init(|| store)))
}

pub(crate) fn record_instance() {
    let count = INSTANCES.fetch_add(1, Ordering::Relaxed) + 1;
    if count > 1 {
        warn!(
            instances = count,
            "Created another remote store client; use gateway::shared to reuse one"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_returns_single_instance() {
        let settings = GatewaySettings {
            url: Some("https://example.supabase.co".into()),
            anon_key: Some("anon".into()),
            service_role_key: None,
        };
        let first = shared(&settings).unwrap();
        let second = shared(&GatewaySettings::default()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(INSTANCES.load(Ordering::Relaxed) >= 1);
    }
}
