use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::channel::types::de_ids;
use crate::channel::{ChannelKey, RequestCookies, proof_cookie, standby_url_for};
use crate::watch::{FavoritesView, hydrate_favorites};

use super::AppState;
use super::error::AppError;

/// Whether a request may see a channel's real stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAccess {
    pub protected: bool,
    pub unlocked: bool,
}

impl ChannelAccess {
    pub fn granted(&self) -> bool {
        !self.protected || self.unlocked
    }
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    passcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HydrateRequest {
    #[serde(default, deserialize_with = "de_ids")]
    ids: Vec<String>,
}

/// Channel ids used for media buckets must be numeric.
fn numeric_channel(raw: &str) -> Result<(ChannelKey, u64), AppError> {
    let key = ChannelKey::new(raw);
    let number = key
        .as_number()
        .ok_or_else(|| AppError::Validation(format!("channel id '{}' is not numeric", raw)))?;
    Ok((key, number))
}

/// Root endpoint — service summary.
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "btvgate",
        "protected_channels": state.protected.len(),
        "remote_store": state.gateway.is_ok(),
        "privileged": state.gateway.as_ref().is_ok_and(|g| g.has_service_key()),
        "passcode": state.passcodes.is_configured(),
    }))
}

/// Channel list from the remote store, annotated with access state.
pub async fn list_channels(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let cookies = RequestCookies::from_headers(&headers);
    let channels = state.gateway()?.channels().await?;

    let channels: Vec<Value> = channels
        .into_iter()
        .map(|channel| {
            let access = state.access(&channel.id, &cookies);
            json!({
                "id": channel.id,
                "name": channel.name,
                "image": channel.image,
                "category": channel.category,
                "protected": access.protected,
                "unlocked": access.unlocked,
            })
        })
        .collect();

    Ok(Json(json!({ "ok": true, "channels": channels })))
}

/// Access state for one channel.
pub async fn channel_access(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    let key = ChannelKey::new(&channel_id);
    let access = state.access(&key, &RequestCookies::from_headers(&headers));
    Json(json!({
        "ok": true,
        "channel": key,
        "protected": access.protected,
        "unlocked": access.unlocked,
        "granted": access.granted(),
    }))
}

/// Passcode unlock — sets the proof cookie for a protected channel.
pub async fn unlock_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    payload: Result<Json<UnlockRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let passcode = request
        .passcode
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("passcode is required".into()))?;

    let key = ChannelKey::new(&channel_id);
    if !state.protected.is_protected(&key) {
        return Ok(Json(json!({ "ok": true, "channel": key, "unlocked": true })).into_response());
    }

    if !state.passcodes.verify(&passcode)? {
        return Err(AppError::Forbidden("incorrect passcode".into()));
    }

    info!(channel = %key, "Channel unlocked");
    let cookie = proof_cookie(&key, state.cookies.ttl, state.cookies.secure);
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "ok": true, "channel": key, "unlocked": true })),
    )
        .into_response())
}

/// Playback source: the standby video while locked, otherwise the real stream.
pub async fn stream_source(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let (key, number) = numeric_channel(&channel_id)?;
    let access = state.access(&key, &RequestCookies::from_headers(&headers));
    let standby = standby_url_for(&state.storage_root, number);

    if !access.granted() {
        return Ok(Json(json!({
            "ok": true,
            "channel": key,
            "url": standby,
            "standby": true,
            "reason": "locked",
        })));
    }

    let channel = state
        .gateway()?
        .channel(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("channel {key} not found")))?;

    let body = match channel.stream_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => json!({
            "ok": true,
            "channel": key,
            "url": url,
            "standby": false,
            "fallback": standby,
        }),
        None => json!({
            "ok": true,
            "channel": key,
            "url": standby,
            "standby": true,
            "reason": "unavailable",
        }),
    };
    Ok(Json(body))
}

/// Standby URL for a channel.
pub async fn standby_source(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let (key, number) = numeric_channel(&channel_id)?;
    Ok(Json(json!({
        "ok": true,
        "channel": key,
        "url": standby_url_for(&state.storage_root, number),
    })))
}

/// Full program records for the caller's favorite ids.
pub async fn favorites(
    State(state): State<AppState>,
    payload: Result<Json<HydrateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let view = match request.ids.as_slice() {
        [] => FavoritesView::Empty,
        ids => hydrate_favorites(state.gateway()?, ids).await?,
    };

    Ok(Json(json!({
        "ok": true,
        "empty": view.is_empty(),
        "message": view.message(),
        "programs": view.programs(),
    })))
}

/// News ticker items, newest first.
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let items = state.gateway()?.news_items().await?;
    Ok(Json(json!({ "ok": true, "items": items })))
}
