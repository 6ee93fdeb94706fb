// src/domain/cache_entry.rs
//
// Cache Entry
//
// One cached provider/backend response. (namespace, key) uniquely
// addresses an entry; overwrites refresh `value` and `updated_at` but
// preserve `created_at`.

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Kind of request this entry caches ("search", "details", ...)
    pub namespace: String,

    /// Deterministic fingerprint of the request parameters
    pub key: String,

    /// Opaque JSON payload as returned by the remote side
    pub value: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
