// src/repositories/cache_repository.rs
//
// Response Cache
//
// Persists remote responses keyed by (namespace, request fingerprint) in
// the SQLite store. Callers must derive keys deterministically from the
// logical request so semantically-equal requests hit the same entry.
//
// Failure policy: caching is best-effort and must never abort the business
// operation it supports. A read error degrades to a miss, a write error is
// logged and swallowed. Every get counts a per-namespace hit or miss.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::params;
use serde_json::Value;

use crate::db::connection::get_connection;
use crate::db::ConnectionPool;
use crate::domain::CacheEntry;
use crate::error::{AppError, AppResult};

/// Kind of request an entry caches. Doubles as the table partition tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Search,
    Details,
    Episodes,
    Update,
}

impl CacheNamespace {
    pub const ALL: [CacheNamespace; 4] = [
        CacheNamespace::Search,
        CacheNamespace::Details,
        CacheNamespace::Episodes,
        CacheNamespace::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheNamespace::Search => "search",
            CacheNamespace::Details => "details",
            CacheNamespace::Episodes => "episodes",
            CacheNamespace::Update => "update",
        }
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fingerprint for update requests: (show, provider, category).
pub fn update_key(show_id: i64, provider_id: i64, category_id: i64) -> String {
    format!("{}:{}:{}", show_id, provider_id, category_id)
}

/// Hit/miss counters for one namespace (or a total across all).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceStats {
    pub hits: u64,
    pub misses: u64,
}

impl NamespaceStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cumulative cache statistics for a run.
#[derive(Debug, Clone, Default)]
pub struct CacheStatistics {
    counters: HashMap<CacheNamespace, NamespaceStats>,
}

impl CacheStatistics {
    pub fn namespace(&self, namespace: CacheNamespace) -> NamespaceStats {
        self.counters.get(&namespace).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> NamespaceStats {
        let mut totals = NamespaceStats::default();
        for stats in self.counters.values() {
            totals.hits += stats.hits;
            totals.misses += stats.misses;
        }
        totals
    }

    fn record_hit(&mut self, namespace: CacheNamespace) {
        self.counters.entry(namespace).or_default().hits += 1;
    }

    fn record_miss(&mut self, namespace: CacheNamespace) {
        self.counters.entry(namespace).or_default().misses += 1;
    }
}

pub trait CacheRepository: Send + Sync {
    /// Look up a cached value. Storage errors degrade to a miss.
    fn get(&self, namespace: CacheNamespace, key: &str) -> Option<Value>;

    /// Store a value, overwriting any previous one. Best-effort.
    fn put(&self, namespace: CacheNamespace, key: &str, value: &Value);

    /// Fetch a full entry including timestamps. Does not touch statistics.
    fn entry(&self, namespace: CacheNamespace, key: &str) -> AppResult<Option<CacheEntry>>;

    /// Snapshot of the hit/miss counters accumulated so far.
    fn statistics(&self) -> CacheStatistics;
}

pub struct SqliteCacheRepository {
    pool: Arc<ConnectionPool>,
    stats: Mutex<CacheStatistics>,
}

impl SqliteCacheRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            stats: Mutex::new(CacheStatistics::default()),
        }
    }

    fn fetch(&self, namespace: CacheNamespace, key: &str) -> AppResult<Option<Value>> {
        let conn = get_connection(&self.pool)?;

        let raw: Option<String> = match conn.query_row(
            "SELECT value FROM cache_entries WHERE namespace = ?1 AND key = ?2",
            params![namespace.as_str(), key],
            |row| row.get(0),
        ) {
            Ok(raw) => Some(raw),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(AppError::Database(e)),
        };

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn store(&self, namespace: CacheNamespace, key: &str, value: &Value) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        let serialized = serde_json::to_string(value)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO cache_entries (namespace, key, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(namespace, key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![namespace.as_str(), key, serialized, now],
        )?;

        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<(String, String, String, String, String), rusqlite::Error> {
        Ok((
            row.get("namespace")?,
            row.get("key")?,
            row.get("value")?,
            row.get("created_at")?,
            row.get("updated_at")?,
        ))
    }
}

impl CacheRepository for SqliteCacheRepository {
    fn get(&self, namespace: CacheNamespace, key: &str) -> Option<Value> {
        match self.fetch(namespace, key) {
            Ok(Some(value)) => {
                self.record(|stats| stats.record_hit(namespace));
                debug!("Cache HIT for {} key '{}'", namespace, key);
                Some(value)
            }
            Ok(None) => {
                self.record(|stats| stats.record_miss(namespace));
                debug!("Cache MISS for {} key '{}'", namespace, key);
                None
            }
            Err(e) => {
                self.record(|stats| stats.record_miss(namespace));
                warn!(
                    "Cache read for {} key '{}' failed, treating as miss: {}",
                    namespace, key, e
                );
                None
            }
        }
    }

    fn put(&self, namespace: CacheNamespace, key: &str, value: &Value) {
        if let Err(e) = self.store(namespace, key, value) {
            warn!("Cache write for {} key '{}' failed: {}", namespace, key, e);
        }
    }

    fn entry(&self, namespace: CacheNamespace, key: &str) -> AppResult<Option<CacheEntry>> {
        let conn = get_connection(&self.pool)?;

        let row = match conn.query_row(
            "SELECT namespace, key, value, created_at, updated_at
             FROM cache_entries WHERE namespace = ?1 AND key = ?2",
            params![namespace.as_str(), key],
            Self::row_to_entry,
        ) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        let (namespace, key, value, created_at, updated_at) = row;
        Ok(Some(CacheEntry {
            namespace,
            key,
            value: serde_json::from_str(&value)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }

    fn statistics(&self) -> CacheStatistics {
        self.stats.lock().expect("cache stats lock").clone()
    }
}

impl SqliteCacheRepository {
    fn record(&self, f: impl FnOnce(&mut CacheStatistics)) {
        f(&mut self.stats.lock().expect("cache stats lock"));
    }
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Other(format!("Invalid cache timestamp '{}': {}", raw, e)))
}
