// src/repositories/state_repository.rs
//
// Processing-state persistence
//
// The state document is small and rewritten wholesale after every
// processed show; a missing file just means a fresh session.

use std::path::PathBuf;

use log::{debug, info};

use crate::domain::ProcessingState;
use crate::error::AppResult;

pub trait StateRepository: Send + Sync {
    fn load(&self) -> AppResult<ProcessingState>;
    fn save(&self, state: &ProcessingState) -> AppResult<()>;
}

pub struct JsonStateRepository {
    path: PathBuf,
}

impl JsonStateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateRepository for JsonStateRepository {
    fn load(&self) -> AppResult<ProcessingState> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {:?}, starting new processing session", self.path);
                return Ok(ProcessingState::default());
            }
            Err(e) => return Err(e.into()),
        };

        let state: ProcessingState = serde_json::from_str(&raw)?;
        info!(
            "Resuming from category {:?}, show index {}",
            state.current_category_id, state.last_processed_index
        );
        Ok(state)
    }

    fn save(&self, state: &ProcessingState) -> AppResult<()> {
        let serialized = serde_json::to_string(state)?;
        std::fs::write(&self.path, serialized)?;
        debug!(
            "Saved state: category {:?}, last_processed_index = {}",
            state.current_category_id, state.last_processed_index
        );
        Ok(())
    }
}
