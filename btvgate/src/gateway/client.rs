use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::channel::standby::object_key_segments;
use crate::channel::{Channel, ChannelKey, NewsItem, Program, StorageRoot};
use crate::config::GatewaySettings;

use super::error::{GatewayError, GatewayResult, error_message};

/// Default lifetime of a signed object URL, in seconds.
pub const DEFAULT_SIGNED_URL_TTL: u64 = 21600;

const CHANNELS: &str = "channels";
const PROGRAMS: &str = "programs";
const NEWS_ITEMS: &str = "news_items";
const USER_ROLES: &str = "user_roles";
const COPY_SCHEDULE_RPC: &str = "copy_published_to_draft";

#[derive(Deserialize)]
struct RoleRow {
    role: Option<String>,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(alias = "signedUrl")]
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/**
    Client for the hosted backend's table, RPC and storage APIs.

    Reads use the public key. Writes, role lookups and signed URLs use the
    service-role key when one is configured, which never leaves the server.
*/
pub struct RemoteStore {
    http: reqwest::Client,
    root: StorageRoot,
    anon_key: String,
    service_key: Option<String>,
}

impl RemoteStore {
    pub fn new(settings: &GatewaySettings) -> GatewayResult<Self> {
        let root = settings.storage_root();
        if root.is_empty() {
            return Err(GatewayError::NotConfigured("SUPABASE_URL"));
        }
        Url::parse(root.as_str()).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;

        let anon_key = settings
            .anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::NotConfigured("SUPABASE_ANON_KEY"))?;
        let service_key = settings
            .service_role_key
            .clone()
            .filter(|k| !k.is_empty());

        super::record_instance();

        Ok(Self {
            http: reqwest::Client::new(),
            root,
            anon_key,
            service_key,
        })
    }

    pub fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    // ── Channels ─────────────────────────────────────────────────────────

    pub async fn channels(&self) -> GatewayResult<Vec<Channel>> {
        self.select(CHANNELS, &[("select", "*".into()), ("order", "id.asc".into())])
            .await
    }

    pub async fn channel(&self, key: &ChannelKey) -> GatewayResult<Option<Channel>> {
        let rows: Vec<Channel> = self
            .select(
                CHANNELS,
                &[("select", "*".into()), ("id", format!("eq.{key}"))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    // ── Programs ─────────────────────────────────────────────────────────

    /// Fetch programs by id. An empty id list never touches the network.
    pub async fn programs_by_ids(&self, ids: &[String]) -> GatewayResult<Vec<Program>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            PROGRAMS,
            &[("select", "*".into()), ("id", in_filter(ids))],
        )
        .await
    }

    // ── Users ────────────────────────────────────────────────────────────

    pub async fn role_for_user(&self, user_id: &str) -> GatewayResult<Option<String>> {
        let url = self.rest_url(
            USER_ROLES,
            &[("select", "role".into()), ("user_id", format!("eq.{user_id}"))],
        )?;
        let response = self
            .authed(self.http.get(url), self.privileged_key())
            .send()
            .await?;
        let rows: Vec<RoleRow> = decode(response).await?;
        Ok(rows.into_iter().find_map(|row| row.role))
    }

    // ── News ticker ──────────────────────────────────────────────────────

    pub async fn news_items(&self) -> GatewayResult<Vec<NewsItem>> {
        self.select(
            NEWS_ITEMS,
            &[("select", "*".into()), ("order", "created_at.desc".into())],
        )
        .await
    }

    pub async fn insert_news_item(&self, text: &str) -> GatewayResult<NewsItem> {
        let url = self.rest_url(NEWS_ITEMS, &[])?;
        let response = self
            .authed(self.http.post(url), self.service_key()?)
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let rows: Vec<NewsItem> = decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".into()))
    }

    pub async fn delete_news_item(&self, id: &str) -> GatewayResult<()> {
        let url = self.rest_url(NEWS_ITEMS, &[("id", format!("eq.{id}"))])?;
        let response = self
            .authed(self.http.delete(url), self.service_key()?)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    // ── Schedule ─────────────────────────────────────────────────────────

    /// Copy the published schedule of one channel and day into its draft.
    /// Both arguments are forwarded as-is to the remote procedure.
    pub async fn copy_published_to_draft(
        &self,
        channel_id: &str,
        day: &str,
    ) -> GatewayResult<serde_json::Value> {
        let url = self.url(&["rest", "v1", "rpc", COPY_SCHEDULE_RPC], &[])?;
        let response = self
            .authed(self.http.post(url), self.service_key()?)
            .json(&serde_json::json!({ "p_channel_id": channel_id, "p_day": day }))
            .send()
            .await?;
        let body = check_status(response).await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    // ── Storage ──────────────────────────────────────────────────────────

    /// Issue a time-limited URL for a private object.
    pub async fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: u64,
    ) -> GatewayResult<String> {
        let key_segments = object_key_segments(key);
        let mut segments = vec!["storage", "v1", "object", "sign", bucket];
        segments.extend(key_segments.iter().map(String::as_str));
        let url = self.url(&segments, &[])?;
        let response = self
            .authed(self.http.post(url), self.service_key()?)
            .json(&serde_json::json!({ "expiresIn": expires_in }))
            .send()
            .await?;
        let signed: SignedUrlResponse = decode(response).await?;
        Ok(format!("{}/storage/v1{}", self.root.as_str(), signed.signed_url))
    }

    // ── Plumbing ─────────────────────────────────────────────────────────

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<Vec<T>> {
        let url = self.rest_url(table, params)?;
        debug!(%url, "remote select");
        let response = self.authed(self.http.get(url), &self.anon_key).send().await?;
        decode(response).await
    }

    fn rest_url(&self, table: &str, params: &[(&str, String)]) -> GatewayResult<Url> {
        self.url(&["rest", "v1", table], params)
    }

    /// Root URL plus path segments, each percent-encoded on its own.
    fn url(&self, segments: &[&str], params: &[(&str, String)]) -> GatewayResult<Url> {
        let mut url = Url::parse(self.root.as_str())
            .map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        let not_base = || GatewayError::InvalidUrl(format!("{} has no path", self.root.as_str()));
        url.path_segments_mut()
            .map_err(|_| not_base())?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder, key: &str) -> RequestBuilder {
        request.header("apikey", key).bearer_auth(key)
    }

    fn service_key(&self) -> GatewayResult<&str> {
        self.service_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))
    }

    fn privileged_key(&self) -> &str {
        self.service_key.as_deref().unwrap_or(&self.anon_key)
    }
}

/// PostgREST `in.(…)` filter. Values with reserved characters are quoted.
fn in_filter(ids: &[String]) -> String {
    let values: Vec<String> = ids
        .iter()
        .map(|id| {
            if id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                id.clone()
            } else {
                format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
            }
        })
        .collect();
    format!("in.({})", values.join(","))
}

async fn check_status(response: Response) -> GatewayResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(GatewayError::Status {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason().unwrap_or("error")),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let body = check_status(response).await?;
    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}
