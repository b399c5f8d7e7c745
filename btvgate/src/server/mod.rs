pub mod admin;
pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::channel::{
    ChannelKey, CredentialSource, PasscodeGate, ProtectedChannels, StorageRoot, has_proof,
};
use crate::config::CookiePolicy;
use crate::gateway::{GatewayResult, RemoteStore};

use error::AppError;
use routes::ChannelAccess;

#[derive(Clone)]
pub struct AppState {
    pub protected: Arc<ProtectedChannels>,
    pub passcodes: Arc<PasscodeGate>,
    pub gateway: Result<Arc<RemoteStore>, String>,
    pub storage_root: StorageRoot,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(
        protected: ProtectedChannels,
        passcodes: PasscodeGate,
        gateway: GatewayResult<Arc<RemoteStore>>,
        storage_root: StorageRoot,
        cookies: CookiePolicy,
    ) -> Self {
        Self {
            protected: Arc::new(protected),
            passcodes: Arc::new(passcodes),
            gateway: gateway.map_err(|e| e.to_string()),
            storage_root,
            cookies,
        }
    }

    /// The remote store, or a configuration error explaining why there is none.
    pub fn gateway(&self) -> Result<&RemoteStore, AppError> {
        self.gateway
            .as_deref()
            .map_err(|reason| AppError::Config(reason.clone()))
    }

    pub fn access(&self, key: &ChannelKey, creds: &impl CredentialSource) -> ChannelAccess {
        ChannelAccess {
            protected: self.protected.is_protected(key),
            unlocked: has_proof(creds, key),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/channels", get(routes::list_channels))
        .route("/channels/{channel_id}/access", get(routes::channel_access))
        .route("/channels/{channel_id}/unlock", post(routes::unlock_channel))
        .route("/channels/{channel_id}/stream", get(routes::stream_source))
        .route("/channels/{channel_id}/standby", get(routes::standby_source))
        .route("/favorites/hydrate", post(routes::favorites))
        .route("/news", get(routes::list_news))
        .route("/admin/protected-channels", get(admin::protected_channels))
        .route("/admin/news", post(admin::create_news))
        .route("/admin/news/{news_id}", delete(admin::delete_news))
        .route("/admin/schedule/copy", post(admin::copy_schedule))
        .route("/admin/storage/signed-url", post(admin::signed_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until the shutdown signal flips.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow_and_update() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}
