//! Seams to the external services the engine depends on.
//!
//! ```text
//! ┌──────────────┐   PersistenceGateway    ┌─────────────────────────┐
//! │              │ ───────────────────────▶│ storage::Storage (redb) │
//! │  RuneEngine  │   InterpretationGateway ┌─────────────────────────┐
//! │              │ ───────────────────────▶│ interpretation::Http…   │
//! │              │   BillingGateway        ┌─────────────────────────┐
//! │              │ ───────────────────────▶│ billing::HttpBilling    │
//! └──────────────┘                         └─────────────────────────┘
//! ```
//!
//! All calls are async request/response. Implementations report failures as
//! [`RuneError`](crate::error::RuneError); the engine turns those into
//! notifications.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RuneResult;
use crate::session::Session;
use crate::spread::SpreadType;
use crate::types::{
    DailyRune, Divination, DivinationId, DrawnRune, FavoriteRune, NewDivination, Orientation,
    Rune, RuneId, Subscription,
};

/// Hosted (or local) record store
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Read the rune catalog
    async fn fetch_runes(&self) -> RuneResult<Vec<Rune>>;

    async fn insert_divination(
        &self,
        session: &Session,
        divination: NewDivination,
    ) -> RuneResult<Divination>;

    async fn update_divination_notes(
        &self,
        session: &Session,
        id: DivinationId,
        notes: Option<String>,
    ) -> RuneResult<Divination>;

    async fn delete_divination(&self, session: &Session, id: DivinationId) -> RuneResult<()>;

    async fn get_divination(
        &self,
        session: &Session,
        id: DivinationId,
    ) -> RuneResult<Option<Divination>>;

    /// The user's divinations, newest first
    async fn list_divinations(&self, session: &Session) -> RuneResult<Vec<Divination>>;

    async fn get_daily_rune(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> RuneResult<Option<DailyRune>>;

    async fn insert_daily_rune(&self, session: &Session, daily: DailyRune) -> RuneResult<DailyRune>;

    async fn update_daily_rune(&self, session: &Session, daily: DailyRune) -> RuneResult<DailyRune>;

    async fn add_favorite(&self, session: &Session, rune_id: &RuneId) -> RuneResult<FavoriteRune>;

    async fn remove_favorite(&self, session: &Session, rune_id: &RuneId) -> RuneResult<()>;

    async fn list_favorites(&self, session: &Session) -> RuneResult<Vec<FavoriteRune>>;

    async fn get_subscription(&self, session: &Session) -> RuneResult<Option<Subscription>>;

    async fn upsert_subscription(
        &self,
        session: &Session,
        subscription: Subscription,
    ) -> RuneResult<Subscription>;
}

/// One rune as sent to the interpretation function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneData {
    pub name: String,
    pub symbol: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reversed_meaning: Option<String>,
    pub orientation: Orientation,
    /// Human-readable position label
    pub position: String,
}

impl From<&DrawnRune> for RuneData {
    fn from(drawn: &DrawnRune) -> Self {
        Self {
            name: drawn.rune.name.clone(),
            symbol: drawn.rune.glyph.clone(),
            meaning: drawn.rune.upright.clone(),
            reversed_meaning: drawn.rune.reversed.clone(),
            orientation: drawn.orientation,
            position: drawn.position.label.to_string(),
        }
    }
}

/// Body of an interpretation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationRequest {
    pub runes: Vec<RuneData>,
    pub spread_type: SpreadType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl InterpretationRequest {
    pub fn new(spread_type: SpreadType, runes: &[DrawnRune], question: Option<&str>) -> Self {
        Self {
            runes: runes.iter().map(RuneData::from).collect(),
            spread_type,
            question: question.map(str::to_string),
        }
    }
}

/// Remote text-generation function
#[async_trait]
pub trait InterpretationGateway: Send + Sync {
    async fn interpret(
        &self,
        session: &Session,
        request: &InterpretationRequest,
    ) -> RuneResult<String>;
}

/// Remote billing processor hand-off
#[async_trait]
pub trait BillingGateway: Send + Sync {
    /// Create a checkout session and return the URL to send the user to
    async fn create_checkout(&self, session: &Session, price_id: &str) -> RuneResult<String>;

    /// Open the customer portal and return its URL
    async fn customer_portal(&self, session: &Session) -> RuneResult<String>;

    /// Confirm a finished checkout; the processor updates the subscription record
    async fn verify_checkout(&self, session: &Session, checkout_session_id: &str)
        -> RuneResult<bool>;
}
