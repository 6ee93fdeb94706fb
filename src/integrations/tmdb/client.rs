// src/integrations/tmdb/client.rs
//
// TMDB API Integration
//
// ARCHITECTURE:
// - REST client for TMDB's TV search and details endpoints
// - Maps external data -> typed candidate records (NO selection logic;
//   choosing among candidates belongs to the resolver)
// - Details responses are cached under the "details" namespace
//
// Transport failures and malformed payloads surface as errors; an empty
// candidate list is a legitimate result, not an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::repositories::{CacheNamespace, CacheRepository};

#[cfg(test)]
use mockall::automock;

/// One entry of the provider's ordered candidate list for a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvCandidate {
    pub id: i64,

    /// Primary (localized) title
    #[serde(default)]
    pub name: Option<String>,

    /// Title in the show's original language
    #[serde(default)]
    pub original_name: Option<String>,

    /// ISO 639-1 tag of the original language
    #[serde(default)]
    pub original_language: Option<String>,
}

impl TvCandidate {
    /// Best display title: primary name, falling back to the original one.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.original_name.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<TvCandidate>,
}

/// Search-by-title and details lookup against the metadata provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Query the search endpoint with a language hint ("ar"/"en").
    /// Returns the provider-ordered candidate list, possibly empty.
    async fn search_tv(&self, query: &str, language: &str) -> AppResult<Vec<TvCandidate>>;

    /// Fetch extended metadata for a provider id (cache-backed).
    async fn get_show_details(&self, provider_id: i64) -> AppResult<Value>;
}

pub struct TmdbClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    cache: Arc<dyn CacheRepository>,
}

impl TmdbClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        cache: Arc<dyn CacheRepository>,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache,
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_tv(&self, query: &str, language: &str) -> AppResult<Vec<TvCandidate>> {
        info!("Searching TMDB for show: {} (language: {})", query, language);

        let url = format!("{}/search/tv", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("language", language),
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("include_adult", "true"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::MalformedResponse(format!("TMDB search response for '{}': {}", query, e))
        })?;

        Ok(parsed.results)
    }

    async fn get_show_details(&self, provider_id: i64) -> AppResult<Value> {
        let key = provider_id.to_string();
        if let Some(cached) = self.cache.get(CacheNamespace::Details, &key) {
            return Ok(cached);
        }

        info!("Getting details for TMDB ID: {}", provider_id);

        let url = format!("{}/tv/{}", self.base_url, provider_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("language", "en"),
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "images,credits,videos"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let details: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::MalformedResponse(format!("TMDB details response for {}: {}", provider_id, e))
        })?;

        self.cache.put(CacheNamespace::Details, &key, &details);
        Ok(details)
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

    #[tokio::test]
    async fn test_details_cache_hit_skips_the_network() {
        let cache = test_cache();
        cache.put(CacheNamespace::Details, "1396", &json!({"id": 1396, "name": "Breaking Bad"}));

        // The base URL is unroutable; a cache hit never reaches it.
        let client = TmdbClient::new("http://127.0.0.1:0", "key", cache).unwrap();
        let details = client.get_show_details(1396).await.unwrap();

        assert_eq!(details["name"], "Breaking Bad");
    }

    #[test]
    fn test_candidate_display_name_prefers_primary() {
        let candidate: TvCandidate = serde_json::from_value(json!({
            "id": 1396,
            "name": "Breaking Bad",
            "original_name": "Breaking Bad (US)",
            "original_language": "en"
        }))
        .unwrap();

        assert_eq!(candidate.display_name(), "Breaking Bad");
    }

    #[test]
    fn test_candidate_display_name_falls_back_to_original() {
        let candidate: TvCandidate = serde_json::from_value(json!({
            "id": 99,
            "original_name": "باب الحارة"
        }))
        .unwrap();

        assert_eq!(candidate.display_name(), "باب الحارة");
    }

    #[test]
    fn test_search_response_requires_results_field() {
        let ok: Result<SearchResponse, _> =
            serde_json::from_value(json!({"results": [{"id": 1}]}));
        assert!(ok.is_ok());

        // A payload without `results` is malformed, not empty
        let bad: Result<SearchResponse, _> =
            serde_json::from_value(json!({"page": 1}));
        assert!(bad.is_err());
    }
}
