// src/repositories/ledger_repository.rs
//
// Not-found ledger persistence
//
// Write-through: every accepted append rewrites the whole document, so
// the ledger survives a crash between shows. The file is pretty-printed;
// it exists for manual follow-up.

use std::path::PathBuf;

use log::info;

use crate::domain::{NotFoundLedger, NotFoundRecord};
use crate::error::AppResult;

pub trait LedgerRepository: Send + Sync {
    fn load(&self) -> AppResult<NotFoundLedger>;

    /// Append a record unless the show id is already present.
    /// Returns whether the ledger changed (and was persisted).
    fn append(&self, record: NotFoundRecord) -> AppResult<bool>;
}

pub struct JsonLedgerRepository {
    path: PathBuf,
}

impl JsonLedgerRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn save(&self, ledger: &NotFoundLedger) -> AppResult<()> {
        let serialized = serde_json::to_string_pretty(ledger)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl LedgerRepository for JsonLedgerRepository {
    fn load(&self) -> AppResult<NotFoundLedger> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(NotFoundLedger::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    fn append(&self, record: NotFoundRecord) -> AppResult<bool> {
        let mut ledger = self.load()?;

        let show_id = record.id;
        if !ledger.insert(record) {
            return Ok(false);
        }

        self.save(&ledger)?;
        info!(
            "Recorded show {} in not-found ledger ({} total)",
            show_id, ledger.total
        );
        Ok(true)
    }
}
