// src/services/batch_service.rs
//
// Batch Processor
//
// Drives one batch per invocation over the catalog, category by category
// in original category order. Nothing inside the loop is fatal to the
// run: every per-show failure is caught at the show boundary, recorded in
// the not-found ledger, and the loop moves on. The only fatal error class
// is failing to load the initial category/show lists (or failing to
// persist state, which would break resumability).
//
// ProcessingState is rewritten after EVERY show, success or failure, and
// again on category transitions - that is the resumability anchor: a
// crash reprocesses at most the one in-flight show, and that reprocess is
// cache-backed on both the resolve and update side.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use serde::de::DeserializeOwned;

use crate::domain::{
    Category, NotFoundRecord, ProcessingState, RunStatistics, Show,
};
use crate::error::AppResult;
use crate::integrations::PlaylistBackend;
use crate::repositories::{
    CacheNamespace, CacheRepository, LedgerRepository, StateRepository,
};
use crate::services::ResolverService;

/// Local JSON files standing in for the backend's list endpoints.
#[derive(Debug, Clone)]
pub struct OfflineCatalog {
    pub categories_path: PathBuf,
    pub shows_path: PathBuf,
}

/// What happened to one show.
enum ShowOutcome {
    Updated,
    NotFound,
    Failed,
}

/// Intermediate result of the fallible part of per-show processing.
enum Processed {
    Updated,
    NotFound { transliterated_name: Option<String> },
    Rejected { transliterated_name: Option<String> },
}

pub struct BatchService {
    backend: Arc<dyn PlaylistBackend>,
    resolver: ResolverService,
    cache: Arc<dyn CacheRepository>,
    state_repo: Arc<dyn StateRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
    batch_size: usize,
    offline: Option<OfflineCatalog>,
}

impl BatchService {
    pub fn new(
        backend: Arc<dyn PlaylistBackend>,
        resolver: ResolverService,
        cache: Arc<dyn CacheRepository>,
        state_repo: Arc<dyn StateRepository>,
        ledger_repo: Arc<dyn LedgerRepository>,
        batch_size: usize,
        offline: Option<OfflineCatalog>,
    ) -> Self {
        Self {
            backend,
            resolver,
            cache,
            state_repo,
            ledger_repo,
            batch_size,
            offline,
        }
    }

    /// Process one batch, rendering the summary and cache report even
    /// when the batch aborts early.
    pub async fn run(&self) -> AppResult<RunStatistics> {
        let (categories, shows) = self.load_catalog().await?;

        let mut stats = RunStatistics::default();
        let result = self.run_batch(&categories, &shows, &mut stats).await;

        self.render_summary(&stats);
        self.render_cache_report();

        result.map(|_| stats)
    }

    async fn load_catalog(&self) -> AppResult<(Vec<Category>, Vec<Show>)> {
        let (categories, shows) = match &self.offline {
            Some(catalog) => {
                info!("Loading data from local JSON files...");
                (
                    load_items_file(&catalog.categories_path)?,
                    load_items_file(&catalog.shows_path)?,
                )
            }
            None => {
                info!("Loading data from API...");
                (
                    self.backend.get_categories().await?,
                    self.backend.get_shows().await?,
                )
            }
        };

        info!(
            "Loaded {} categories and {} shows",
            categories.len(),
            shows.len()
        );

        let orphans = shows
            .iter()
            .filter(|s| !categories.iter().any(|c| c.id == s.category_id))
            .count();
        if orphans > 0 {
            warn!("{} shows reference an unknown category and will be skipped", orphans);
        }

        Ok((categories, shows))
    }

    async fn run_batch(
        &self,
        categories: &[Category],
        shows: &[Show],
        stats: &mut RunStatistics,
    ) -> AppResult<()> {
        if categories.is_empty() {
            info!("No categories to process");
            return Ok(());
        }

        let mut state = self.state_repo.load()?;

        let category_index = match state.current_category_id {
            Some(id) => match categories.iter().position(|c| c.id == id) {
                Some(index) => index,
                None => {
                    warn!(
                        "Persisted category {} no longer exists, restarting from the first category",
                        id
                    );
                    state = ProcessingState::default();
                    0
                }
            },
            None => 0,
        };

        let category = &categories[category_index];
        if state.current_category_id.is_none() {
            state.current_category_id = Some(category.id);
            self.state_repo.save(&state)?;
        }

        let category_shows: Vec<&Show> = shows
            .iter()
            .filter(|s| s.category_id == category.id)
            .collect();

        let start = state.last_processed_index;
        let end = (start + self.batch_size).min(category_shows.len());

        if start < end {
            info!(
                "Processing shows {} to {} of {} in category '{}'",
                start + 1,
                end,
                category_shows.len(),
                category.name
            );

            for index in start..end {
                let show = category_shows[index];
                info!(
                    "Processing show {}/{}: {}",
                    index + 1,
                    category_shows.len(),
                    show.name
                );

                match self.process_show(show, category).await {
                    ShowOutcome::Updated => stats.record_updated(),
                    ShowOutcome::NotFound => stats.record_not_found(),
                    ShowOutcome::Failed => stats.record_failed(),
                }

                // State advances regardless of the outcome above
                state.advance_show();
                self.state_repo.save(&state)?;
            }
        }

        if state.last_processed_index >= category_shows.len() {
            match categories.get(category_index + 1) {
                Some(next) => {
                    info!(
                        "Category '{}' complete, advancing to '{}'",
                        category.name, next.name
                    );
                    state.advance_category(Some(next.id));
                }
                None => {
                    info!("All categories processed");
                    state.advance_category(None);
                }
            }
            self.state_repo.save(&state)?;
        }

        Ok(())
    }

    /// Per-show boundary: errors end up in the ledger, never in the loop.
    async fn process_show(&self, show: &Show, category: &Category) -> ShowOutcome {
        match self.try_process(show).await {
            Ok(Processed::Updated) => ShowOutcome::Updated,
            Ok(Processed::NotFound { transliterated_name }) => {
                error!("Could not find show '{}' on TMDB", show.name);
                self.record_not_found(show, category, transliterated_name, None);
                ShowOutcome::NotFound
            }
            Ok(Processed::Rejected { transliterated_name }) => {
                error!("Backend did not acknowledge update for show '{}'", show.name);
                self.record_not_found(
                    show,
                    category,
                    transliterated_name,
                    Some("update not acknowledged by backend".to_string()),
                );
                ShowOutcome::Failed
            }
            Err(e) => {
                error!("Error processing show '{}': {}", show.name, e);
                self.record_not_found(show, category, None, Some(e.to_string()));
                ShowOutcome::Failed
            }
        }
    }

    async fn try_process(&self, show: &Show) -> AppResult<Processed> {
        let resolution = self.resolver.search(&show.name).await?;

        let Some(matched) = resolution.outcome else {
            return Ok(Processed::NotFound {
                transliterated_name: resolution.transliterated_name,
            });
        };

        info!(
            "Found TMDB match: {} (ID: {})",
            matched.matched_name, matched.provider_id
        );

        // Warm the episode cache; the payload itself is not needed for the
        // update, but a failure here still counts against this show.
        self.backend.get_episodes(show.id).await?;

        let acknowledged = self
            .backend
            .update_show(show.id, matched.provider_id, show.category_id)
            .await?;

        if acknowledged {
            info!("Successfully updated show: {}", show.name);
            Ok(Processed::Updated)
        } else {
            Ok(Processed::Rejected {
                transliterated_name: resolution.transliterated_name,
            })
        }
    }

    fn record_not_found(
        &self,
        show: &Show,
        category: &Category,
        transliterated_name: Option<String>,
        error_message: Option<String>,
    ) {
        let record = NotFoundRecord {
            id: show.id,
            name: show.name.clone(),
            category_id: show.category_id,
            category_name: category.name.clone(),
            transliterated_name,
            error: error_message,
        };

        // Ledger writes are bookkeeping; a failure here must not take
        // down the batch.
        if let Err(e) = self.ledger_repo.append(record) {
            error!("Failed to persist not-found ledger for show {}: {}", show.id, e);
        }
    }

    fn render_summary(&self, stats: &RunStatistics) {
        info!(
            "Run summary: {} processed, {} updated, {} not found, {} failed",
            stats.processed, stats.updated, stats.not_found, stats.failed
        );
    }

    fn render_cache_report(&self) {
        let statistics = self.cache.statistics();

        for namespace in CacheNamespace::ALL {
            let stats = statistics.namespace(namespace);
            if stats.lookups() > 0 {
                info!(
                    "Cache {}: {} hits, {} misses ({:.1}% hit rate)",
                    namespace,
                    stats.hits,
                    stats.misses,
                    stats.hit_rate() * 100.0
                );
            }
        }

        let totals = statistics.totals();
        info!(
            "Cache statistics - Hits: {}, Misses: {}, Hit rate: {:.1}%",
            totals.hits,
            totals.misses,
            totals.hit_rate() * 100.0
        );
    }
}

fn load_items_file<T: DeserializeOwned>(path: &std::path::Path) -> AppResult<Vec<T>> {
    #[derive(serde::Deserialize)]
    struct ItemsFile<T> {
        items: Vec<T>,
    }

    let raw = std::fs::read_to_string(path)?;
    let parsed: ItemsFile<T> = serde_json::from_str(&raw)?;
    Ok(parsed.items)
}
