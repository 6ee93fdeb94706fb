// src/domain/processing_state.rs
//
// Processing State
//
// The resumability anchor: persisted synchronously after every processed
// show, so an interrupted run resumes from the last fully-recorded index
// and reprocesses at most the one in-flight item.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingState {
    /// Category currently being worked through; `None` before the first
    /// show of a session and after the last category completes.
    pub current_category_id: Option<i64>,

    /// 0-based offset into the current category's show list.
    pub last_processed_index: usize,
}

impl ProcessingState {
    pub fn advance_show(&mut self) {
        self.last_processed_index += 1;
    }

    /// Move to the next category, or back to idle when none remains.
    pub fn advance_category(&mut self, next_category_id: Option<i64>) {
        self.current_category_id = next_category_id;
        self.last_processed_index = 0;
    }
}
