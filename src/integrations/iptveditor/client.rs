// src/integrations/iptveditor/client.rs
//
// IPTV Editor API Integration
//
// ARCHITECTURE:
// - REST client for the playlist backend's category/show/episode/update
//   endpoints (all POST with token + playlist in the JSON body)
// - Episode lists and update responses are cached; category and show
//   lists are fetched once per run and are not
// - The backend fronts a browser app and expects its header set
//
// `update_show` never raises on transport problems: a failed or
// unacknowledged update is reported as `false` and the caller decides
// how to record it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{Category, Show};
use crate::error::{AppError, AppResult};
use crate::repositories::{update_key, CacheNamespace, CacheRepository};

#[cfg(test)]
use mockall::automock;

/// Literal body the backend echoes for an accepted save.
pub const UPDATE_ACK: &str = r#"{"status":"ok"}"#;

/// Envelope the backend wraps list payloads in.
#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

/// Catalog access and the update write-back path.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlaylistBackend: Send + Sync {
    async fn get_categories(&self) -> AppResult<Vec<Category>>;

    async fn get_shows(&self) -> AppResult<Vec<Show>>;

    /// Episode list for a show (cache-backed; opaque payload, used to
    /// warm the cache rather than for its contents).
    async fn get_episodes(&self, show_id: i64) -> AppResult<Value>;

    /// Push a matched provider id back to the backend.
    /// `Ok(true)` only when the backend answered with the exact
    /// acknowledgement body.
    async fn update_show(
        &self,
        show_id: i64,
        provider_id: i64,
        category_id: i64,
    ) -> AppResult<bool>;
}

pub struct IptvEditorClient {
    http_client: Client,
    base_url: String,
    token: String,
    playlist: String,
    cache: Arc<dyn CacheRepository>,
}

impl IptvEditorClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        playlist: impl Into<String>,
        cache: Arc<dyn CacheRepository>,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(default_headers())
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            token: token.into(),
            playlist: playlist.into(),
            cache,
        })
    }

    async fn post_json(&self, path: &str, payload: &Value) -> AppResult<String> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    fn list_payload(&self) -> Value {
        json!({
            "playlist": self.playlist,
            "token": self.token,
        })
    }

    fn parse_items<T: serde::de::DeserializeOwned>(body: &str, what: &str) -> AppResult<Vec<T>> {
        let envelope: ItemsEnvelope<T> = serde_json::from_str(body).map_err(|e| {
            AppError::MalformedResponse(format!("IPTV Editor {} response: {}", what, e))
        })?;
        Ok(envelope.items)
    }
}

/// Whether a save response is the exact acknowledgement literal.
pub fn is_acknowledged(body: &str) -> bool {
    body.trim() == UPDATE_ACK
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://cloud.iptveditor.com"));
    headers.insert(REFERER, HeaderValue::from_static("https://cloud.iptveditor.com/"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
        ),
    );
    headers
}

#[async_trait]
impl PlaylistBackend for IptvEditorClient {
    async fn get_categories(&self) -> AppResult<Vec<Category>> {
        info!("Loading categories from IPTV Editor");
        let body = self
            .post_json("category/series/get-data", &self.list_payload())
            .await?;
        Self::parse_items(&body, "categories")
    }

    async fn get_shows(&self) -> AppResult<Vec<Show>> {
        info!("Loading shows from IPTV Editor");
        let body = self
            .post_json("stream/series/get-data", &self.list_payload())
            .await?;
        Self::parse_items(&body, "shows")
    }

    async fn get_episodes(&self, show_id: i64) -> AppResult<Value> {
        let key = show_id.to_string();
        if let Some(cached) = self.cache.get(CacheNamespace::Episodes, &key) {
            return Ok(cached);
        }

        let payload = json!({
            "seriesId": key,
            "url": null,
            "token": self.token,
        });
        let body = self.post_json("episode/get-data", &payload).await?;

        let episodes: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::MalformedResponse(format!("IPTV Editor episodes response: {}", e))
        })?;

        self.cache.put(CacheNamespace::Episodes, &key, &episodes);
        Ok(episodes)
    }

    async fn update_show(
        &self,
        show_id: i64,
        provider_id: i64,
        category_id: i64,
    ) -> AppResult<bool> {
        let key = update_key(show_id, provider_id, category_id);
        if let Some(cached) = self.cache.get(CacheNamespace::Update, &key) {
            let body = cached.as_str().unwrap_or_default().to_string();
            return Ok(is_acknowledged(&body));
        }

        let payload = json!({
            "items": [{
                "id": show_id,
                "tmdb": provider_id,
                "youtube_trailer": "",
                "category": category_id,
            }],
            "checkSaved": false,
            "token": self.token,
        });

        let body = match self.post_json("stream/series/save", &payload).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to update show {}: {}", show_id, e);
                return Ok(false);
            }
        };

        // The raw body is cached, not the verdict; cache hits go through
        // the same acknowledgement check.
        self.cache
            .put(CacheNamespace::Update, &key, &Value::String(body.clone()));

        Ok(is_acknowledged(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, initialize_database};
    use crate::repositories::SqliteCacheRepository;
    use serde_json::json;

    fn test_cache() -> Arc<SqliteCacheRepository> {
        let pool = create_test_pool();
        {
            let conn = pool.get().unwrap();
            initialize_database(&conn).unwrap();
        }
        Arc::new(SqliteCacheRepository::new(Arc::new(pool)))
    }

    // The base URL in these tests is unroutable; a cache hit never
    // reaches it.
    fn test_client(cache: Arc<SqliteCacheRepository>) -> IptvEditorClient {
        IptvEditorClient::new("http://127.0.0.1:0", "token", "12345", cache).unwrap()
    }

    #[tokio::test]
    async fn test_cached_acknowledgement_yields_true_without_network() {
        let cache = test_cache();
        cache.put(
            CacheNamespace::Update,
            &update_key(3816, 1396, 1),
            &Value::String(UPDATE_ACK.to_string()),
        );

        let client = test_client(cache);
        assert!(client.update_show(3816, 1396, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_cached_rejection_yields_false() {
        let cache = test_cache();
        cache.put(
            CacheNamespace::Update,
            &update_key(3816, 1396, 1),
            &Value::String(r#"{"status":"error"}"#.to_string()),
        );

        let client = test_client(cache);
        assert!(!client.update_show(3816, 1396, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_cached_episodes_skip_the_network() {
        let cache = test_cache();
        cache.put(CacheNamespace::Episodes, "3816", &json!({"episodes": [1, 2]}));

        let client = test_client(cache);
        let episodes = client.get_episodes(3816).await.unwrap();
        assert_eq!(episodes, json!({"episodes": [1, 2]}));
    }

    #[test]
    fn test_acknowledgement_literal_matches() {
        assert!(is_acknowledged(r#"{"status":"ok"}"#));
        assert!(is_acknowledged("  {\"status\":\"ok\"}\n"));
    }

    #[test]
    fn test_any_other_body_is_a_failure() {
        assert!(!is_acknowledged(r#"{"status":"error"}"#));
        assert!(!is_acknowledged(r#"{"status": "ok"}"#)); // different literal
        assert!(!is_acknowledged(""));
        assert!(!is_acknowledged("OK"));
    }

    #[test]
    fn test_items_envelope_parses_shows() {
        let body = r#"{"items": [{"id": 3816, "name": "Breaking Bad", "category": 1}]}"#;
        let shows: Vec<Show> = IptvEditorClient::parse_items(body, "shows").unwrap();

        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].id, 3816);
    }

    #[test]
    fn test_missing_items_field_is_malformed() {
        let result: AppResult<Vec<Category>> =
            IptvEditorClient::parse_items(r#"{"rows": []}"#, "categories");

        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
