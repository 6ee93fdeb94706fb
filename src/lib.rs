// src/lib.rs
// ShowSync - batch reconciler linking IPTV playlist shows to TMDB metadata
//
// Architecture:
// - domain: typed records shared across layers
// - repositories: cache store and state/ledger files behind traits
// - integrations: the two HTTP collaborators (TMDB, IPTV Editor)
// - services: resolver and the resumable batch loop
// - language: script detection + transliteration used by the resolver

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod integrations;
pub mod language;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain records
// ============================================================================

pub use domain::{
    CacheEntry,
    Category,
    MatchResult,
    NotFoundLedger,
    NotFoundRecord,
    ProcessingState,
    Resolution,
    RunStatistics,
    Show,
};

// ============================================================================
// PUBLIC API - Error types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Storage
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};
pub use repositories::{
    CacheNamespace,
    CacheRepository,
    CacheStatistics,
    JsonLedgerRepository,
    JsonStateRepository,
    LedgerRepository,
    SqliteCacheRepository,
    StateRepository,
};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{IptvEditorClient, MetadataProvider, PlaylistBackend, TmdbClient};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{BatchService, OfflineCatalog, ResolverService, SampleService};
