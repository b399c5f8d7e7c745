use std::collections::HashMap;

use crate::channel::Program;
use crate::channel::types::canonical_id;
use crate::gateway::{GatewayResult, RemoteStore};

use super::progress::WatchState;
use super::store::{LocalStore, StoreError};

/// Local key holding the favorite program ids as a JSON array.
pub const FAVORITES_KEY: &str = "btv_favorites";

/// Shown instead of a list when there is nothing to show.
pub const NO_FAVORITES_MESSAGE: &str = "No favorites yet";

impl<S: LocalStore> WatchState<S> {
    /// Favorite program ids in the order they were added. Malformed data
    /// reads as no favorites.
    pub fn favorite_ids(&self) -> Vec<String> {
        let Some(raw) = self.store().get(FAVORITES_KEY) else {
            return Vec::new();
        };
        let Ok(ids) = serde_json::from_str::<Vec<serde_json::Value>>(&raw) else {
            return Vec::new();
        };
        let mut seen = Vec::with_capacity(ids.len());
        for id in ids {
            let id = match id {
                serde_json::Value::String(s) => canonical_id(&s),
                serde_json::Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !id.is_empty() && !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Append a favorite. Returns false if it was already there.
    pub fn add_favorite(&mut self, program_id: &str) -> Result<bool, StoreError> {
        let id = canonical_id(program_id);
        let mut ids = self.favorite_ids();
        if id.is_empty() || ids.contains(&id) {
            return Ok(false);
        }
        ids.push(id);
        self.write_favorites(&ids)?;
        Ok(true)
    }

    /// Remove a favorite. Returns false if it was not there.
    pub fn remove_favorite(&mut self, program_id: &str) -> Result<bool, StoreError> {
        let id = canonical_id(program_id);
        let mut ids = self.favorite_ids();
        let before = ids.len();
        ids.retain(|existing| existing != &id);
        if ids.len() == before {
            return Ok(false);
        }
        self.write_favorites(&ids)?;
        Ok(true)
    }

    /// Flip a favorite. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&mut self, program_id: &str) -> Result<bool, StoreError> {
        if self.remove_favorite(program_id)? {
            Ok(false)
        } else {
            self.add_favorite(program_id)
        }
    }

    fn write_favorites(&mut self, ids: &[String]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(ids)?;
        self.store_mut().set(FAVORITES_KEY, encoded)
    }
}

/// What the favorites page shows.
#[derive(Debug, Clone)]
pub enum FavoritesView {
    Empty,
    Programs(Vec<Program>),
}

impl FavoritesView {
    pub fn is_empty(&self) -> bool {
        matches!(self, FavoritesView::Empty)
    }

    pub fn programs(&self) -> &[Program] {
        match self {
            FavoritesView::Empty => &[],
            FavoritesView::Programs(programs) => programs,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_FAVORITES_MESSAGE)
    }
}

/**
    Load full program records for a list of favorite ids.

    No ids means no request. Ids that no longer exist remotely are dropped;
    if none remain the view is empty rather than an error. Programs come back
    in favorites order.
*/
pub async fn hydrate_favorites(
    gateway: &RemoteStore,
    ids: &[String],
) -> GatewayResult<FavoritesView> {
    if ids.is_empty() {
        return Ok(FavoritesView::Empty);
    }

    let mut by_id: HashMap<String, Program> = gateway
        .programs_by_ids(ids)
        .await?
        .into_iter()
        .map(|program| (program.id.clone(), program))
        .collect();

    let programs: Vec<Program> = ids
        .iter()
        .filter_map(|id| by_id.remove(&canonical_id(id)))
        .collect();

    if programs.is_empty() {
        Ok(FavoritesView::Empty)
    } else {
        Ok(FavoritesView::Programs(programs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySettings;
    use crate::watch::store::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn gateway(server: &MockServer) -> RemoteStore {
        RemoteStore::new(&GatewaySettings {
            url: Some(server.uri()),
            anon_key: Some("anon".into()),
            service_role_key: None,
        })
        .unwrap()
    }

    #[test]
    fn test_favorites_add_remove_toggle() {
        let mut state = WatchState::new(MemoryStore::new());
        assert!(state.favorite_ids().is_empty());

        assert!(state.add_favorite("12").unwrap());
        assert!(state.add_favorite("7").unwrap());
        assert!(!state.add_favorite("012").unwrap());
        assert_eq!(state.favorite_ids(), vec!["12", "7"]);

        assert!(state.remove_favorite("12").unwrap());
        assert!(!state.remove_favorite("12").unwrap());
        assert!(!state.toggle_favorite("7").unwrap());
        assert!(state.toggle_favorite("9").unwrap());
        assert_eq!(state.favorite_ids(), vec!["9"]);
    }

    #[test]
    fn test_favorite_ids_tolerate_bad_data() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "{oops".into()).unwrap();
        assert!(WatchState::new(store).favorite_ids().is_empty());

        let mut store = MemoryStore::new();
        store
            .set(FAVORITES_KEY, r#"[3, "3", null, "x", "", {"id": 1}]"#.into())
            .unwrap();
        assert_eq!(WatchState::new(store).favorite_ids(), vec!["3", "x"]);
    }

    #[tokio::test]
    async fn test_hydrate_empty_ids_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let view = hydrate_favorites(&gateway(&server).await, &[]).await.unwrap();
        assert!(view.is_empty());
        assert!(view.programs().is_empty());
        assert_eq!(view.message(), Some(NO_FAVORITES_MESSAGE));
    }

    #[tokio::test]
    async fn test_hydrate_no_matches_is_empty_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/programs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let view = hydrate_favorites(&gateway(&server).await, &["404".into()])
            .await
            .unwrap();
        assert!(view.is_empty());
        assert_eq!(view.message(), Some(NO_FAVORITES_MESSAGE));
    }

    #[tokio::test]
    async fn test_hydrate_keeps_favorites_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/programs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "title": "One"},
                {"id": 2, "title": "Two"}
            ])))
            .mount(&server)
            .await;

        let ids = vec!["2".to_string(), "99".to_string(), "1".to_string()];
        let view = hydrate_favorites(&gateway(&server).await, &ids).await.unwrap();
        let titles: Vec<_> = view
            .programs()
            .iter()
            .map(|p| p.title.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(titles, vec!["Two", "One"]);
        assert_eq!(view.message(), None);
    }

    #[tokio::test]
    async fn test_hydrate_propagates_remote_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = hydrate_favorites(&gateway(&server).await, &["1".into()]).await;
        assert!(result.is_err());
    }
}
