// src/repositories/mod.rs
//
// Repositories Module - Storage access behind traits

pub mod cache_repository;
pub mod ledger_repository;
pub mod state_repository;

pub use cache_repository::{
    update_key, CacheNamespace, CacheRepository, CacheStatistics, NamespaceStats,
    SqliteCacheRepository,
};
pub use ledger_repository::{JsonLedgerRepository, LedgerRepository};
pub use state_repository::{JsonStateRepository, StateRepository};
