//! Daily Rune Storage - one drawn rune per user per calendar day

use crate::error::RuneError;
use crate::types::{DailyRune, UserId};
use chrono::NaiveDate;
use redb::{ReadableTable, TableDefinition};

use super::Storage;

/// Table for daily runes (key: "user|YYYY-MM-DD", value: postcard DailyRune)
pub(crate) const DAILY_RUNES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("daily_runes");

fn daily_key(user_id: &UserId, date: NaiveDate) -> String {
    format!("{}|{}", user_id.as_str(), date.format("%Y-%m-%d"))
}

impl Storage {
    /// Save a daily rune, overwriting any entry for the same user and date.
    pub fn save_daily_rune(&self, daily: &DailyRune) -> Result<(), RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(DAILY_RUNES_TABLE)?;
            let serialized = postcard::to_allocvec(daily)
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            let key = daily_key(&daily.user_id, daily.date);
            table.insert(key.as_str(), serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Save a daily rune only if none exists for that user and date.
    ///
    /// Returns the stored entry: the new one, or the one that was already there.
    pub fn insert_daily_rune_if_absent(&self, daily: &DailyRune) -> Result<DailyRune, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        let stored = {
            let mut table = write_txn.open_table(DAILY_RUNES_TABLE)?;
            let key = daily_key(&daily.user_id, daily.date);
            let existing = match table.get(key.as_str())? {
                Some(v) => Some(
                    postcard::from_bytes::<DailyRune>(v.value())
                        .map_err(|e| RuneError::Serialization(e.to_string()))?,
                ),
                None => None,
            };
            match existing {
                Some(existing) => existing,
                None => {
                    let serialized = postcard::to_allocvec(daily)
                        .map_err(|e| RuneError::Serialization(e.to_string()))?;
                    table.insert(key.as_str(), serialized.as_slice())?;
                    daily.clone()
                }
            }
        };
        write_txn.commit()?;
        Ok(stored)
    }

    /// Load the daily rune for a user and date.
    pub fn load_daily_rune(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyRune>, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(DAILY_RUNES_TABLE)?;

        if let Some(data) = table.get(daily_key(user_id, date).as_str())? {
            let daily: DailyRune = postcard::from_bytes(data.value())
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            Ok(Some(daily))
        } else {
            Ok(None)
        }
    }
}
