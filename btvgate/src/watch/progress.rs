use serde::{Deserialize, Serialize};

use super::store::{LocalStore, StoreError};

/// Key prefix for per-video playback progress.
pub const PROGRESS_KEY_PREFIX: &str = "video_progress_";

/// Sentinel written by the admin login page.
pub const ADMIN_AUTH_KEY: &str = "btv_admin_auth";

/// Playback progress for one video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Seconds into the video.
    pub position: f64,
    /// Total length in seconds.
    pub duration: f64,
    /// When the position was recorded, epoch milliseconds.
    pub timestamp: i64,
}

impl ProgressPayload {
    /// Fraction watched, clamped to `0.0..=1.0`. Zero when the duration is unknown.
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub fn progress_key(video_source_id: &str) -> String {
    format!("{PROGRESS_KEY_PREFIX}{video_source_id}")
}

/**
    Client-side watch state: progress, continue watching and favorites.

    Reads never fail: a missing or malformed entry reads as absent.
    Writes replace the stored value wholesale.
*/
#[derive(Debug, Default)]
pub struct WatchState<S> {
    store: S,
}

impl<S: LocalStore> WatchState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored progress for a video. Only a JSON object with the payload
    /// fields counts; anything else reads as absent.
    pub fn get_progress(&self, video_source_id: &str) -> Option<ProgressPayload> {
        let raw = self.store.get(&progress_key(video_source_id))?;
        match serde_json::from_str(&raw).ok()? {
            value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// Overwrite the progress entry for a video.
    pub fn set_progress(
        &mut self,
        video_source_id: &str,
        payload: &ProgressPayload,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(payload)?;
        self.store.set(&progress_key(video_source_id), encoded)
    }

    /// Ids of every video with a progress entry, in the store's own order.
    pub fn list_in_progress_video_ids(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(PROGRESS_KEY_PREFIX)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Readable progress entries, most recently watched first.
    pub fn continue_watching(&self) -> Vec<(String, ProgressPayload)> {
        let mut entries: Vec<(String, ProgressPayload)> = self
            .list_in_progress_video_ids()
            .into_iter()
            .filter_map(|id| self.get_progress(&id).map(|p| (id, p)))
            .collect();
        entries.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Drop every progress entry. Returns how many were removed.
    pub fn clear_progress(&mut self) -> Result<usize, StoreError> {
        let ids = self.list_in_progress_video_ids();
        for id in &ids {
            self.store.remove(&progress_key(id))?;
        }
        Ok(ids.len())
    }

    pub fn admin_token_present(&self) -> bool {
        self.store
            .get(ADMIN_AUTH_KEY)
            .is_some_and(|token| !token.trim().is_empty())
    }

    pub(super) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
