// src/services/resolver_service.rs
//
// Metadata Resolver
//
// Turns a show title into a best-effort provider match. The full outcome
// of a resolution (including "nothing found") is cached under the `search`
// namespace keyed by the original title, so a title costs at most one
// trip through the network path per cache lifetime.
//
// Resolution order:
//   1. cached outcome, sentinel included
//   2. script detection, then provider search under the detected hint
//   3. candidate selection: exact title match, original-language match,
//      optional first-result fallback
//   4. on an empty Arabic-script result: transliterated retry under a
//      Latin hint, then a last retry with the original title + Latin hint
//
// Transport and malformed-response errors propagate; the resolver only
// guesses in the face of legitimate empty results, and an errored attempt
// is never cached.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::domain::{MatchResult, Resolution};
use crate::error::AppResult;
use crate::integrations::{MetadataProvider, TvCandidate};
use crate::language::{detect_script, transliterate, Script};
use crate::repositories::{CacheNamespace, CacheRepository};

/// Result of one query against the provider.
enum Attempt {
    /// A candidate passed selection
    Match(MatchResult),
    /// Candidates came back but none was acceptable
    NoMatch,
    /// The provider returned an empty candidate list
    Empty,
}

pub struct ResolverService {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn CacheRepository>,
    fallback_to_first_result: bool,
}

impl ResolverService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn CacheRepository>,
        fallback_to_first_result: bool,
    ) -> Self {
        Self {
            provider,
            cache,
            fallback_to_first_result,
        }
    }

    /// Resolve a title to a provider match, or a recorded not-found.
    pub async fn search(&self, title: &str) -> AppResult<Resolution> {
        if let Some(cached) = self.cache.get(CacheNamespace::Search, title) {
            match serde_json::from_value::<Resolution>(cached) {
                Ok(resolution) => {
                    debug!("Using cached resolution for '{}'", title);
                    return Ok(resolution);
                }
                Err(e) => {
                    warn!("Ignoring undecodable cached resolution for '{}': {}", title, e);
                }
            }
        }

        let script = detect_script(title);
        debug!("Detected script for '{}': {}", title, script.language_code());

        let mut transliterated_name = None;

        let outcome = match self.attempt(title, script.language_code()).await? {
            Attempt::Match(result) => Some(result),
            Attempt::NoMatch => None,
            Attempt::Empty if script == Script::Arabic => {
                let latin_form = transliterate(title);
                info!(
                    "No results for '{}', retrying with transliteration '{}'",
                    title, latin_form
                );
                let retry = self
                    .attempt(&latin_form, Script::Latin.language_code())
                    .await?;
                transliterated_name = Some(latin_form);

                match retry {
                    Attempt::Match(result) => Some(result),
                    _ => {
                        info!("Retrying '{}' with a Latin language hint", title);
                        match self.attempt(title, Script::Latin.language_code()).await? {
                            Attempt::Match(result) => Some(result),
                            _ => None,
                        }
                    }
                }
            }
            Attempt::Empty => None,
        };

        let resolution = match outcome {
            Some(result) => Resolution::found(result, transliterated_name),
            None => Resolution::not_found(transliterated_name),
        };

        self.cache.put(
            CacheNamespace::Search,
            title,
            &serde_json::to_value(&resolution)?,
        );
        Ok(resolution)
    }

    async fn attempt(&self, query: &str, language: &str) -> AppResult<Attempt> {
        let candidates = self.provider.search_tv(query, language).await?;
        if candidates.is_empty() {
            warn!("No results found for show: {}", query);
            return Ok(Attempt::Empty);
        }
        Ok(self.select(query, language, &candidates))
    }

    /// Pick among provider-ordered candidates.
    fn select(&self, query: &str, language: &str, candidates: &[TvCandidate]) -> Attempt {
        if let Some(candidate) = candidates.iter().find(|c| {
            title_matches(c.name.as_deref(), query) || title_matches(c.original_name.as_deref(), query)
        }) {
            info!("Found exact title match for '{}'", query);
            return Attempt::Match(to_match_result(candidate));
        }

        if let Some(candidate) = candidates
            .iter()
            .find(|c| c.original_language.as_deref() == Some(language))
        {
            info!("Found match in detected language ({})", language);
            return Attempt::Match(to_match_result(candidate));
        }

        if self.fallback_to_first_result {
            warn!(
                "No matches found for '{}' in language '{}', using first available result as fallback",
                query, language
            );
            return Attempt::Match(to_match_result(&candidates[0]));
        }

        warn!(
            "No suitable matches found for '{}' (language: {}, fallback disabled)",
            query, language
        );
        Attempt::NoMatch
    }
}

fn title_matches(candidate_title: Option<&str>, query: &str) -> bool {
    candidate_title
        .map(|t| t.to_lowercase() == query.to_lowercase())
        .unwrap_or(false)
}

fn to_match_result(candidate: &TvCandidate) -> MatchResult {
    MatchResult {
        provider_id: candidate.id,
        matched_name: candidate.display_name(),
        original_language_code: candidate.original_language.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, initialize_database};
    use crate::error::AppError;
    use crate::integrations::MockMetadataProvider;
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

    fn candidate(id: i64, name: &str, language: &str) -> TvCandidate {
        TvCandidate {
            id,
            name: Some(name.to_string()),
            original_name: Some(name.to_string()),
            original_language: Some(language.to_string()),
        }
    }

    fn resolver(provider: MockMetadataProvider, fallback: bool) -> ResolverService {
        ResolverService::new(Arc::new(provider), test_cache(), fallback)
    }

    #[tokio::test]
    async fn test_exact_match_wins_over_language_and_fallback() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .withf(|query, language| query == "Breaking Bad" && language == "en")
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    candidate(10, "Braking Badly", "en"),
                    candidate(1396, "Breaking Bad", "en"),
                ])
            });

        let resolution = resolver(provider, true).search("Breaking Bad").await.unwrap();

        let matched = resolution.outcome.unwrap();
        assert_eq!(matched.provider_id, 1396);
        assert_eq!(matched.matched_name, "Breaking Bad");
        assert!(resolution.transliterated_name.is_none());
    }

    #[tokio::test]
    async fn test_exact_match_is_case_insensitive() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![candidate(7, "BREAKING BAD", "en")]));

        let resolution = resolver(provider, false).search("breaking bad").await.unwrap();
        assert_eq!(resolution.outcome.unwrap().provider_id, 7);
    }

    #[tokio::test]
    async fn test_language_match_when_no_exact_title() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .withf(|query, language| query == "باب الحارة" && language == "ar")
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    candidate(1, "Unrelated", "en"),
                    candidate(2, "مسلسل آخر", "ar"),
                ])
            });

        let resolution = resolver(provider, true).search("باب الحارة").await.unwrap();
        assert_eq!(resolution.outcome.unwrap().provider_id, 2);
    }

    #[tokio::test]
    async fn test_fallback_to_first_result_when_enabled() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![candidate(5, "Something Else", "ko")]));

        let resolution = resolver(provider, true).search("My Show").await.unwrap();
        assert_eq!(resolution.outcome.unwrap().provider_id, 5);
    }

    #[tokio::test]
    async fn test_no_fallback_yields_not_found() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![candidate(5, "Something Else", "ko")]));

        let resolution = resolver(provider, false).search("My Show").await.unwrap();
        assert!(resolution.is_not_found());
    }

    #[tokio::test]
    async fn test_second_search_is_served_from_cache() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![candidate(1396, "Breaking Bad", "en")]));

        let service = resolver(provider, true);
        let first = service.search("Breaking Bad").await.unwrap();
        let second = service.search("Breaking Bad").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_not_found_sentinel_is_cached_too() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = resolver(provider, true);
        let first = service.search("No Such Show").await.unwrap();
        let second = service.search("No Such Show").await.unwrap();

        assert!(first.is_not_found());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transliterated_retry_finds_match() {
        let title = "البيت";
        let latin = transliterate(title);
        assert_eq!(latin, "albyt");

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .withf(|query, language| query == "البيت" && language == "ar")
            .times(1)
            .returning(|_, _| Ok(vec![]));
        provider
            .expect_search_tv()
            .withf(|query, language| query == "albyt" && language == "en")
            .times(1)
            .returning(|_, _| Ok(vec![candidate(77, "albyt", "ar")]));

        let resolution = resolver(provider, true).search(title).await.unwrap();

        let matched = resolution.outcome.unwrap();
        assert_eq!(matched.provider_id, 77);
        assert_eq!(resolution.transliterated_name.as_deref(), Some("albyt"));
    }

    #[tokio::test]
    async fn test_final_retry_uses_original_title_with_latin_hint() {
        let title = "البيت";

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .withf(|query, language| query == "البيت" && language == "ar")
            .times(1)
            .returning(|_, _| Ok(vec![]));
        provider
            .expect_search_tv()
            .withf(|query, language| query == "albyt" && language == "en")
            .times(1)
            .returning(|_, _| Ok(vec![]));
        provider
            .expect_search_tv()
            .withf(|query, language| query == "البيت" && language == "en")
            .times(1)
            .returning(|_, _| Ok(vec![candidate(88, "The House", "en")]));

        let resolution = resolver(provider, true).search(title).await.unwrap();
        assert_eq!(resolution.outcome.unwrap().provider_id, 88);
    }

    #[tokio::test]
    async fn test_latin_title_never_gets_transliterated_retry() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .withf(|query, language| query == "Unknown Show" && language == "en")
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let resolution = resolver(provider, true).search("Unknown Show").await.unwrap();

        assert!(resolution.is_not_found());
        assert!(resolution.transliterated_name.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_propagates_and_is_not_cached() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(2)
            .returning(|_, _| Err(AppError::Other("connection reset".to_string())));

        let service = resolver(provider, true);
        assert!(service.search("Breaking Bad").await.is_err());
        // The failed attempt was not cached: the second call reaches the
        // provider again (enforced by times(2) above).
        assert!(service.search("Breaking Bad").await.is_err());
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_falls_through_to_network() {
        let cache = test_cache();
        cache.put(CacheNamespace::Search, "My Show", &json!("not a resolution"));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_tv()
            .times(1)
            .returning(|_, _| Ok(vec![candidate(3, "My Show", "en")]));

        let service = ResolverService::new(Arc::new(provider), cache, true);
        let resolution = service.search("My Show").await.unwrap();
        assert_eq!(resolution.outcome.unwrap().provider_id, 3);
    }
}
