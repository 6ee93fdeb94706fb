// src/integrations/mod.rs
//
// External Integrations Module
//
// The two HTTP collaborators: the metadata provider (TMDB) and the
// playlist backend (IPTV Editor). Both are infrastructure - they map
// remote payloads to typed records and never touch batch state.

pub mod iptveditor;
pub mod tmdb;

pub use iptveditor::client::{IptvEditorClient, PlaylistBackend, UPDATE_ACK};
pub use tmdb::client::{MetadataProvider, TmdbClient, TvCandidate};

#[cfg(test)]
pub use iptveditor::client::MockPlaylistBackend;
#[cfg(test)]
pub use tmdb::client::MockMetadataProvider;
