use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::channel::types::de_opt_raw_id;
use crate::gateway::DEFAULT_SIGNED_URL_TTL;

use super::AppState;
use super::error::AppError;

/// Header carrying the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyScheduleRequest {
    #[serde(default, deserialize_with = "de_opt_raw_id")]
    channel_id: Option<String>,
    #[serde(default)]
    day: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    #[serde(default)]
    bucket: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Resolve the caller's user id and check it has the admin role.
async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Forbidden("admin access requires a signed-in user".into()))?;

    let role = state.gateway()?.role_for_user(user_id).await?;
    if role.as_deref() != Some(ADMIN_ROLE) {
        return Err(AppError::Forbidden("admin role required".into()));
    }
    Ok(user_id.to_string())
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Protected channel list for the admin console.
pub async fn protected_channels(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers).await?;
    Ok(Json(json!({ "ok": true, "channels": state.protected.list() })))
}

pub async fn create_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewsRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let user = require_admin(&state, &headers).await?;
    let Json(request) = payload?;
    let text =
        required(request.text).ok_or_else(|| AppError::Validation("text is required".into()))?;

    let item = state.gateway()?.insert_news_item(&text).await?;
    info!(%user, id = %item.id, "News item created");
    Ok(Json(json!({ "ok": true, "item": item })))
}

pub async fn delete_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(news_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user = require_admin(&state, &headers).await?;
    state.gateway()?.delete_news_item(&news_id).await?;
    info!(%user, id = %news_id, "News item deleted");
    Ok(Json(json!({ "ok": true })))
}

/// Copy one channel's published schedule for a day into its draft.
pub async fn copy_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CopyScheduleRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let user = require_admin(&state, &headers).await?;
    let Json(request) = payload?;

    let channel_id = required(request.channel_id);
    let day = required(request.day);
    let (Some(channel_id), Some(day)) = (channel_id, day) else {
        return Err(AppError::Validation("channelId and day are required".into()));
    };

    let result = state
        .gateway()?
        .copy_published_to_draft(&channel_id, &day)
        .await?;
    info!(%user, channel = %channel_id, %day, "Copied published schedule to draft");
    Ok(Json(json!({ "ok": true, "result": result })))
}

/// Issue a time-limited URL for a private object.
pub async fn signed_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SignedUrlRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &headers).await?;
    let Json(request) = payload?;

    let (Some(bucket), Some(key)) = (required(request.bucket), required(request.key)) else {
        return Err(AppError::Validation("bucket and key are required".into()));
    };
    let expires_in = match request.expires_in {
        None => DEFAULT_SIGNED_URL_TTL,
        Some(0) => return Err(AppError::Validation("expiresIn must be positive".into())),
        Some(secs) => secs,
    };

    let url = state
        .gateway()?
        .signed_url(&bucket, &key, expires_in)
        .await?;
    Ok(Json(json!({ "ok": true, "url": url, "expiresIn": expires_in })))
}
