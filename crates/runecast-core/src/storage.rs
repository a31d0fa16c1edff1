//! Persistent storage using redb.
//!
//! This module is the local implementation of the persistence gateway and
//! provides ACID-compliant storage for:
//! - The rune catalog
//! - Completed divinations
//! - Daily runes
//! - Favorite runes
//! - Subscription records

use crate::catalog::RuneCatalog;
use crate::error::RuneError;
use crate::types::{Rune, RuneId};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// Submodules
mod daily;
mod divinations;
mod favorites;
mod gateway;
mod subscriptions;

use daily::DAILY_RUNES_TABLE;
use divinations::DIVINATIONS_TABLE;
use favorites::FAVORITES_TABLE;
use subscriptions::SUBSCRIPTIONS_TABLE;

// Table definitions
const RUNES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("runes");

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    /// - Seed the Elder Futhark catalog if the runes table is empty
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RuneError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RUNES_TABLE)?;
            let _ = write_txn.open_table(DIVINATIONS_TABLE)?;
            let _ = write_txn.open_table(DAILY_RUNES_TABLE)?;
            let _ = write_txn.open_table(FAVORITES_TABLE)?;
            let _ = write_txn.open_table(SUBSCRIPTIONS_TABLE)?;
        }
        write_txn.commit()?;

        let storage = Self {
            db: Arc::new(RwLock::new(db)),
        };
        storage.seed_catalog(&RuneCatalog::elder_futhark())?;
        Ok(storage)
    }

    /// Get a reference to the shared database handle
    pub(crate) fn db_handle(&self) -> Arc<RwLock<Database>> {
        self.db.clone()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Catalog Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert the catalog if no runes are stored yet.
    ///
    /// Returns the number of runes written (0 when already seeded).
    pub fn seed_catalog(&self, catalog: &RuneCatalog) -> Result<usize, RuneError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        let written = {
            let mut table = write_txn.open_table(RUNES_TABLE)?;
            if table.len()? > 0 {
                0
            } else {
                for rune in catalog.runes() {
                    let data = serde_json::to_vec(rune)
                        .map_err(|e| RuneError::Serialization(e.to_string()))?;
                    table.insert(rune.id.as_str(), data.as_slice())?;
                }
                catalog.len()
            }
        };
        write_txn.commit()?;

        if written > 0 {
            info!(count = written, "seeded rune catalog");
        }
        Ok(written)
    }

    /// Load a single rune by id.
    pub fn load_rune(&self, id: &RuneId) -> Result<Option<Rune>, RuneError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(RUNES_TABLE)?;

        match table.get(id.as_str())? {
            Some(v) => {
                let rune: Rune = serde_json::from_slice(v.value())
                    .map_err(|e| RuneError::Serialization(e.to_string()))?;
                Ok(Some(rune))
            }
            None => Ok(None),
        }
    }

    /// Load every stored rune, ordered by futhark position.
    pub fn list_runes(&self) -> Result<Vec<Rune>, RuneError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(RUNES_TABLE)?;

        let mut runes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let rune: Rune = serde_json::from_slice(value.value())
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            runes.push(rune);
        }
        runes.sort_by_key(|r| r.position);
        Ok(runes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.redb");
        let storage = Storage::new(&db_path).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_storage_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/path/to/test.redb");
        let storage = Storage::new(&db_path);
        assert!(storage.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_catalog_seeded_on_create() {
        let (storage, _temp) = create_test_storage();

        let runes = storage.list_runes().unwrap();
        assert_eq!(runes.len(), 24);
        assert_eq!(runes[0].name, "Fehu");
        assert_eq!(runes[23].name, "Othala");
    }

    #[test]
    fn test_seed_is_idempotent_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.redb");

        {
            let storage = Storage::new(&db_path).unwrap();
            assert_eq!(
                storage.seed_catalog(&RuneCatalog::elder_futhark()).unwrap(),
                0
            );
        }

        let storage = Storage::new(&db_path).unwrap();
        assert_eq!(storage.list_runes().unwrap().len(), 24);
    }

    #[test]
    fn test_load_rune() {
        let (storage, _temp) = create_test_storage();

        let sowilo = storage.load_rune(&RuneId::new("sowilo")).unwrap().unwrap();
        assert_eq!(sowilo.glyph, "ᛊ");
        assert!(storage.load_rune(&RuneId::new("wyrd")).unwrap().is_none());
    }
}
