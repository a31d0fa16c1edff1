//! Favorite Storage - runes bookmarked by each user

use crate::error::RuneError;
use crate::types::{FavoriteRune, RuneId, UserId};
use redb::{ReadableTable, TableDefinition};

use super::Storage;

/// Table for favorites (key: "user|rune_id", value: postcard FavoriteRune)
pub(crate) const FAVORITES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("user_favorite_runes");

fn favorite_key(user_id: &UserId, rune_id: &RuneId) -> String {
    format!("{}|{}", user_id.as_str(), rune_id.as_str())
}

impl Storage {
    /// Add a favorite. Adding the same rune twice keeps the original entry.
    pub fn save_favorite(&self, favorite: &FavoriteRune) -> Result<FavoriteRune, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        let stored = {
            let mut table = write_txn.open_table(FAVORITES_TABLE)?;
            let key = favorite_key(&favorite.user_id, &favorite.rune_id);
            let existing = match table.get(key.as_str())? {
                Some(v) => Some(
                    postcard::from_bytes::<FavoriteRune>(v.value())
                        .map_err(|e| RuneError::Serialization(e.to_string()))?,
                ),
                None => None,
            };
            match existing {
                Some(existing) => existing,
                None => {
                    let serialized = postcard::to_allocvec(favorite)
                        .map_err(|e| RuneError::Serialization(e.to_string()))?;
                    table.insert(key.as_str(), serialized.as_slice())?;
                    favorite.clone()
                }
            }
        };
        write_txn.commit()?;
        Ok(stored)
    }

    /// Remove a favorite.
    ///
    /// Returns `Ok(())` even if the favorite doesn't exist.
    pub fn delete_favorite(&self, user_id: &UserId, rune_id: &RuneId) -> Result<(), RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(FAVORITES_TABLE)?;
            table.remove(favorite_key(user_id, rune_id).as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List a user's favorites, oldest first.
    pub fn list_favorites_for(&self, user_id: &UserId) -> Result<Vec<FavoriteRune>, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(FAVORITES_TABLE)?;

        let mut favorites = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let favorite: FavoriteRune = postcard::from_bytes(value.value())
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            if &favorite.user_id == user_id {
                favorites.push(favorite);
            }
        }
        favorites.sort_by_key(|f| f.created_at);

        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn favorite(user: &str, rune: &str, created_at: i64) -> FavoriteRune {
        FavoriteRune {
            user_id: UserId::new(user),
            rune_id: RuneId::new(rune),
            created_at,
        }
    }

    #[test]
    fn test_add_list_remove_favorites() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("test.redb")).unwrap();
        let user = UserId::new("u1");

        storage.save_favorite(&favorite("u1", "laguz", 2)).unwrap();
        storage.save_favorite(&favorite("u1", "algiz", 1)).unwrap();
        storage.save_favorite(&favorite("u2", "fehu", 1)).unwrap();

        let listed: Vec<_> = storage
            .list_favorites_for(&user)
            .unwrap()
            .into_iter()
            .map(|f| f.rune_id.0)
            .collect();
        assert_eq!(listed, vec!["algiz", "laguz"]);

        storage.delete_favorite(&user, &RuneId::new("algiz")).unwrap();
        storage.delete_favorite(&user, &RuneId::new("algiz")).unwrap();
        assert_eq!(storage.list_favorites_for(&user).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_favorite_keeps_original() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("test.redb")).unwrap();

        storage.save_favorite(&favorite("u1", "laguz", 5)).unwrap();
        let again = storage.save_favorite(&favorite("u1", "laguz", 9)).unwrap();

        assert_eq!(again.created_at, 5);
        assert_eq!(
            storage.list_favorites_for(&UserId::new("u1")).unwrap().len(),
            1
        );
    }
}
