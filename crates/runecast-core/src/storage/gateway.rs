//! `PersistenceGateway` backed by the local redb database.
//!
//! Records owned by another user are reported as not found.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::error::{RuneError, RuneResult};
use crate::gateway::PersistenceGateway;
use crate::session::Session;
use crate::types::{
    DailyRune, Divination, DivinationId, FavoriteRune, NewDivination, Rune, RuneId, Subscription,
};

use super::Storage;

impl Storage {
    fn owned_divination(&self, session: &Session, id: DivinationId) -> RuneResult<Divination> {
        match self.load_divination(&id)? {
            Some(div) if div.user_id == session.user_id => Ok(div),
            _ => Err(RuneError::DivinationNotFound(id.to_string_repr())),
        }
    }
}

#[async_trait]
impl PersistenceGateway for Storage {
    async fn fetch_runes(&self) -> RuneResult<Vec<Rune>> {
        self.list_runes()
    }

    async fn insert_divination(
        &self,
        session: &Session,
        divination: NewDivination,
    ) -> RuneResult<Divination> {
        if divination.user_id != session.user_id {
            return Err(RuneError::AuthenticationRequired);
        }
        let record = Divination::from_new(divination);
        self.save_divination(&record)?;
        debug!(id = %record.id, spread = %record.divination_type, "divination stored");
        Ok(record)
    }

    async fn update_divination_notes(
        &self,
        session: &Session,
        id: DivinationId,
        notes: Option<String>,
    ) -> RuneResult<Divination> {
        let mut record = self.owned_divination(session, id)?;
        record.notes = notes;
        self.save_divination(&record)?;
        Ok(record)
    }

    async fn delete_divination(&self, session: &Session, id: DivinationId) -> RuneResult<()> {
        self.owned_divination(session, id)?;
        self.remove_divination(&id)?;
        Ok(())
    }

    async fn get_divination(
        &self,
        session: &Session,
        id: DivinationId,
    ) -> RuneResult<Option<Divination>> {
        Ok(self
            .load_divination(&id)?
            .filter(|div| div.user_id == session.user_id))
    }

    async fn list_divinations(&self, session: &Session) -> RuneResult<Vec<Divination>> {
        self.list_divinations_for(&session.user_id)
    }

    async fn get_daily_rune(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> RuneResult<Option<DailyRune>> {
        self.load_daily_rune(&session.user_id, date)
    }

    async fn insert_daily_rune(&self, session: &Session, daily: DailyRune) -> RuneResult<DailyRune> {
        if daily.user_id != session.user_id {
            return Err(RuneError::AuthenticationRequired);
        }
        self.insert_daily_rune_if_absent(&daily)
    }

    async fn update_daily_rune(&self, session: &Session, daily: DailyRune) -> RuneResult<DailyRune> {
        if daily.user_id != session.user_id {
            return Err(RuneError::AuthenticationRequired);
        }
        if self.load_daily_rune(&daily.user_id, daily.date)?.is_none() {
            return Err(RuneError::Storage(format!(
                "no daily rune for {}",
                daily.date
            )));
        }
        self.save_daily_rune(&daily)?;
        Ok(daily)
    }

    async fn add_favorite(&self, session: &Session, rune_id: &RuneId) -> RuneResult<FavoriteRune> {
        if self.load_rune(rune_id)?.is_none() {
            return Err(RuneError::RuneNotFound(rune_id.to_string()));
        }
        self.save_favorite(&FavoriteRune {
            user_id: session.user_id.clone(),
            rune_id: rune_id.clone(),
            created_at: Utc::now().timestamp(),
        })
    }

    async fn remove_favorite(&self, session: &Session, rune_id: &RuneId) -> RuneResult<()> {
        self.delete_favorite(&session.user_id, rune_id)
    }

    async fn list_favorites(&self, session: &Session) -> RuneResult<Vec<FavoriteRune>> {
        self.list_favorites_for(&session.user_id)
    }

    async fn get_subscription(&self, session: &Session) -> RuneResult<Option<Subscription>> {
        self.load_subscription(&session.user_id)
    }

    async fn upsert_subscription(
        &self,
        session: &Session,
        subscription: Subscription,
    ) -> RuneResult<Subscription> {
        if subscription.user_id != session.user_id {
            return Err(RuneError::AuthenticationRequired);
        }
        self.save_subscription(&subscription)?;
        Ok(subscription)
    }
}
