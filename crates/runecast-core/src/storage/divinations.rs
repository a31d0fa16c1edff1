//! Divination Storage - completed spreads and their notes

use crate::error::RuneError;
use crate::types::{Divination, DivinationId, UserId};
use redb::{ReadableTable, TableDefinition};

use super::Storage;

/// Table for divinations (key: ULID string, value: JSON Divination)
pub(crate) const DIVINATIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("divinations");

impl Storage {
    // ═══════════════════════════════════════════════════════════════════════
    // Divination Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Save a divination.
    ///
    /// If a divination with the same ID exists, it will be overwritten.
    pub fn save_divination(&self, divination: &Divination) -> Result<(), RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(DIVINATIONS_TABLE)?;
            let data = serde_json::to_vec(divination)
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            let key = divination.id.to_string_repr();
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a divination by ID.
    ///
    /// Returns `None` if no divination with the given ID exists.
    pub fn load_divination(&self, id: &DivinationId) -> Result<Option<Divination>, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(DIVINATIONS_TABLE)?;
        let key = id.to_string_repr();

        match table.get(key.as_str())? {
            Some(v) => {
                let divination: Divination = serde_json::from_slice(v.value())
                    .map_err(|e| RuneError::Serialization(e.to_string()))?;
                Ok(Some(divination))
            }
            None => Ok(None),
        }
    }

    /// Delete a divination.
    ///
    /// Returns `true` if a record was removed.
    pub fn remove_divination(&self, id: &DivinationId) -> Result<bool, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(DIVINATIONS_TABLE)?;
            let key = id.to_string_repr();
            let removed = table.remove(key.as_str())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// List a user's divinations, newest first.
    pub fn list_divinations_for(&self, user_id: &UserId) -> Result<Vec<Divination>, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(DIVINATIONS_TABLE)?;

        let mut divinations = Vec::new();
        // Keys are monotonic ULIDs, so reverse iteration is newest first
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            let divination: Divination = serde_json::from_slice(value.value())
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            if &divination.user_id == user_id {
                divinations.push(divination);
            }
        }

        Ok(divinations)
    }
}
