//! Subscription Storage - billing state per user

use crate::error::RuneError;
use crate::types::{Subscription, UserId};
use redb::{ReadableTable, TableDefinition};

use super::Storage;

/// Table for subscriptions (key: user id, value: JSON Subscription)
pub(crate) const SUBSCRIPTIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("subscriptions");

impl Storage {
    /// Insert or replace a user's subscription record.
    pub fn save_subscription(&self, subscription: &Subscription) -> Result<(), RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let write_txn = db_guard.begin_write()?;
        {
            let mut table = write_txn.open_table(SUBSCRIPTIONS_TABLE)?;
            let data = serde_json::to_vec(subscription)
                .map_err(|e| RuneError::Serialization(e.to_string()))?;
            table.insert(subscription.user_id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load a user's subscription record.
    pub fn load_subscription(&self, user_id: &UserId) -> Result<Option<Subscription>, RuneError> {
        let db = self.db_handle();
        let db_guard = db.read();
        let read_txn = db_guard.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS_TABLE)?;

        match table.get(user_id.as_str())? {
            Some(v) => {
                let subscription: Subscription = serde_json::from_slice(v.value())
                    .map_err(|e| RuneError::Serialization(e.to_string()))?;
                Ok(Some(subscription))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubscriptionStatus;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_subscription() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("test.redb")).unwrap();
        let user = UserId::new("u1");

        assert!(storage.load_subscription(&user).unwrap().is_none());

        let now = Utc::now();
        let mut sub = Subscription::inactive(user.clone());
        sub.status = SubscriptionStatus::Active;
        sub.plan_type = Some("monthly".into());
        sub.current_period_start = Some(now);
        sub.current_period_end = Some(now + Duration::days(30));
        storage.save_subscription(&sub).unwrap();

        let loaded = storage.load_subscription(&user).unwrap().unwrap();
        assert_eq!(loaded, sub);

        sub.status = SubscriptionStatus::Canceled;
        storage.save_subscription(&sub).unwrap();
        assert_eq!(
            storage.load_subscription(&user).unwrap().unwrap().status,
            SubscriptionStatus::Canceled
        );
    }
}
