// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod batch_service;
pub mod resolver_service;
pub mod sample_service;

pub use batch_service::{BatchService, OfflineCatalog};
pub use resolver_service::ResolverService;
pub use sample_service::SampleService;
