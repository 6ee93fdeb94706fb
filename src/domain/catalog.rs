// src/domain/catalog.rs
//
// Catalog entities as served by the playlist backend.
//
// Both are read-only reference data for a run: shows are loaded once,
// iterated by category, and never mutated locally. The only write path
// back to the backend is the update call carrying the matched provider id.

use serde::{Deserialize, Serialize};

/// A show entry in the backend's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// Backend-assigned identifier
    pub id: i64,

    /// Display title, in its original script
    pub name: String,

    /// Owning category (wire field name: `category`)
    #[serde(rename = "category")]
    pub category_id: i64,
}

/// A category in the backend's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
