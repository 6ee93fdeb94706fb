// src/config.rs
//
// Runtime configuration
//
// Everything external lives here: credentials for the two APIs, base URLs
// (overridable for staging setups), the data directory holding the cache
// store and state files, and the batch tuning knobs. Values come from the
// environment (a .env file is honored by the binary before this runs).

use std::path::PathBuf;

use crate::error::{AppError, AppResult};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IPTVEDITOR_BASE_URL: &str = "https://editor.iptveditor.com/api";
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// File names inside the data directory.
pub const CACHE_DB_FILE: &str = "cache.db";
pub const STATE_FILE: &str = "editor_state.json";
pub const LEDGER_FILE: &str = "not_found_shows.json";
pub const CATEGORIES_FILE: &str = "tvshows-categories.json";
pub const SHOWS_FILE: &str = "tvshows-shows.json";
pub const SAMPLES_DIR: &str = "samples";

#[derive(Debug, Clone)]
pub struct Config {
    /// TMDB API key (`TMDB_API_KEY`, required)
    pub tmdb_api_key: String,

    /// IPTV Editor bearer token (`IPTVEDITOR_TOKEN`, required)
    pub iptveditor_token: String,

    /// IPTV Editor playlist identifier (`IPTVEDITOR_PLAYLIST`, required)
    pub iptveditor_playlist: String,

    pub tmdb_base_url: String,
    pub iptveditor_base_url: String,

    /// Directory holding cache.db, the state file and the not-found ledger
    pub data_dir: PathBuf,

    /// Whether an unmatched search may fall back to the provider's first result
    /// (`SHOWSYNC_FALLBACK_FIRST`, default true)
    pub fallback_to_first_result: bool,

    /// Shows processed per invocation
    pub batch_size: usize,
}

impl Config {
    /// Build configuration from the process environment.
    ///
    /// Missing required credentials produce `AppError::Config` so the
    /// binary can abort before any network or disk work happens.
    pub fn from_env() -> AppResult<Self> {
        let data_dir = match std::env::var("SHOWSYNC_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_dir()?,
        };

        Ok(Self {
            tmdb_api_key: require_env("TMDB_API_KEY")?,
            iptveditor_token: require_env("IPTVEDITOR_TOKEN")?,
            iptveditor_playlist: require_env("IPTVEDITOR_PLAYLIST")?,
            tmdb_base_url: env_or("TMDB_BASE_URL", DEFAULT_TMDB_BASE_URL),
            iptveditor_base_url: env_or("IPTVEDITOR_BASE_URL", DEFAULT_IPTVEDITOR_BASE_URL),
            data_dir,
            fallback_to_first_result: env_flag("SHOWSYNC_FALLBACK_FIRST", true),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Ensure the data directory exists, creating it if necessary.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    pub fn cache_db_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_DB_FILE)
    }

    pub fn state_file_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn ledger_file_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    pub fn categories_file_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE)
    }

    pub fn shows_file_path(&self) -> PathBuf {
        self.data_dir.join(SHOWS_FILE)
    }

    pub fn samples_dir(&self) -> PathBuf {
        self.data_dir.join(SAMPLES_DIR)
    }
}

/// Default data directory: {APP_DATA}/showsync
fn default_data_dir() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Config("Could not determine app data directory".to_string()))?;
    Ok(app_data_dir.join("showsync"))
}

fn require_env(key: &str) -> AppResult<String> {
    std::env::var(key)
        .map_err(|_| AppError::Config(format!("Required environment variable {} is not set", key)))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(value.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(data_dir: PathBuf) -> Config {
        Config {
            tmdb_api_key: "key".to_string(),
            iptveditor_token: "token".to_string(),
            iptveditor_playlist: "12345".to_string(),
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            iptveditor_base_url: DEFAULT_IPTVEDITOR_BASE_URL.to_string(),
            data_dir,
            fallback_to_first_result: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[test]
    fn test_data_dir_paths() {
        let config = test_config(PathBuf::from("/tmp/showsync-test"));

        assert!(config.cache_db_path().ends_with("cache.db"));
        assert!(config.state_file_path().ends_with("editor_state.json"));
        assert!(config.ledger_file_path().ends_with("not_found_shows.json"));
        assert!(config.samples_dir().ends_with("samples"));
    }

    #[test]
    fn test_env_flag_parsing() {
        // No variable set: default wins either way
        assert!(env_flag("SHOWSYNC_TEST_FLAG_UNSET", true));
        assert!(!env_flag("SHOWSYNC_TEST_FLAG_UNSET", false));
    }
}
