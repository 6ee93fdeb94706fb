// src/services/sample_service.rs
//
// Sample Collector
//
// Exercises each remote endpoint once with known-good inputs and writes
// the raw responses under the samples directory, for offline inspection
// of payload shapes. Not part of the batch flow.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::integrations::{MetadataProvider, PlaylistBackend};

/// Known-good inputs: a title with an exact-name candidate and a series
/// id that exists in the backend.
const SAMPLE_QUERY: &str = "Breaking Bad";
const SAMPLE_SHOW_ID: i64 = 3816;
const SAMPLE_CATEGORY_ID: i64 = 1;

pub struct SampleService {
    provider: Arc<dyn MetadataProvider>,
    backend: Arc<dyn PlaylistBackend>,
    samples_dir: PathBuf,
}

impl SampleService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        backend: Arc<dyn PlaylistBackend>,
        samples_dir: PathBuf,
    ) -> Self {
        Self {
            provider,
            backend,
            samples_dir,
        }
    }

    pub async fn collect(&self) -> AppResult<()> {
        info!("Getting TMDB search response...");
        let candidates = self.provider.search_tv(SAMPLE_QUERY, "en").await?;
        self.save("tmdb/search_show.json", &serde_json::to_value(&candidates)?)?;

        let first = candidates.first().ok_or_else(|| {
            AppError::Other(format!("No search results for sample query '{}'", SAMPLE_QUERY))
        })?;

        info!("Getting TMDB details for show ID {}...", first.id);
        let details = self.provider.get_show_details(first.id).await?;
        self.save("tmdb/show_details.json", &details)?;

        info!("Getting IPTV Editor episodes response...");
        let episodes = self.backend.get_episodes(SAMPLE_SHOW_ID).await?;
        self.save("iptveditor/episodes.json", &episodes)?;

        info!("Getting IPTV Editor update show response...");
        let acknowledged = self
            .backend
            .update_show(SAMPLE_SHOW_ID, first.id, SAMPLE_CATEGORY_ID)
            .await?;
        self.save(
            "iptveditor/update_show.json",
            &json!({ "acknowledged": acknowledged }),
        )?;

        Ok(())
    }

    fn save(&self, relative: &str, data: &Value) -> AppResult<()> {
        let path = self.samples_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, serde_json::to_string_pretty(data)?)?;
        info!("Saved response to {}", path.display());
        Ok(())
    }
}
