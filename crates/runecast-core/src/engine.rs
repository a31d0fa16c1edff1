//! Main RuneEngine - the primary entry point for Runecast
//!
//! RuneEngine coordinates the catalog, the draw algorithm, the reading state
//! machine and the three gateways:
//! - Persistence of completed readings, daily runes, favorites, subscriptions
//! - On-demand interpretations
//! - Billing hand-off for premium spreads
//!
//! Gateway failures are caught here, published to the [`Notifier`] and
//! returned to the caller; nothing is retried automatically.
//!
//! # Example
//!
//! ```ignore
//! use runecast_core::{ReadingScope, RuneConfig, RuneEngine, Session, SpreadType, UserId};
//!
//! let engine = RuneEngine::open(&RuneConfig::load("~/.runecast")?)?;
//! let session = Session::new(UserId::new("astrid"));
//! let scope = ReadingScope::new();
//!
//! let mut reading = engine
//!     .start_reading(&session, SpreadType::ThreeRune, "What should I focus on?")
//!     .await?;
//! for i in 0..reading.runes().len() {
//!     engine.reveal(&session, &mut reading, i, &scope).await?;
//! }
//! assert!(reading.divination_id().is_some());
//! ```

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, OnceCell};
use tracing::{debug, info, warn};

use crate::billing::HttpBilling;
use crate::catalog::RuneCatalog;
use crate::config::RuneConfig;
use crate::draw::{draw_oriented, draw_spread};
use crate::error::{RuneError, RuneResult};
use crate::gateway::{
    BillingGateway, InterpretationGateway, InterpretationRequest, PersistenceGateway,
};
use crate::interpretation::HttpInterpreter;
use crate::notify::{Notification, Notifier};
use crate::reading::{CompletedReading, Reading, RevealOutcome};
use crate::scope::ReadingScope;
use crate::session::Session;
use crate::spread::SpreadType;
use crate::storage::Storage;
use crate::types::{
    DailyRune, Divination, DivinationId, DrawnRune, FavoriteRune, Subscription,
};
use crate::validation::validate_notes;
use crate::yes_no::YesNoAnswer;

/// What an engine-level reveal did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStatus {
    AlreadyRevealed,
    Revealed { remaining: usize },
    /// The reading completed; `saved` is the stored record id if the save succeeded
    Completed { saved: Option<DivinationId> },
}

/// Builder for [`RuneEngine`]
pub struct RuneEngineBuilder {
    store: Arc<dyn PersistenceGateway>,
    interpreter: Option<Arc<dyn InterpretationGateway>>,
    billing: Option<Arc<dyn BillingGateway>>,
    premium_price_id: Option<String>,
    seed: Option<u64>,
}

impl RuneEngineBuilder {
    pub fn interpreter(mut self, interpreter: Arc<dyn InterpretationGateway>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn billing(mut self, billing: Arc<dyn BillingGateway>) -> Self {
        self.billing = Some(billing);
        self
    }

    pub fn premium_price_id(mut self, price_id: impl Into<String>) -> Self {
        self.premium_price_id = Some(price_id.into());
        self
    }

    /// Fix the PRNG seed (reproducible draws in tests)
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> RuneEngine {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RuneEngine {
            store: self.store,
            interpreter: self.interpreter,
            billing: self.billing,
            premium_price_id: self.premium_price_id,
            catalog: OnceCell::new(),
            notifier: Notifier::new(),
            rng: Mutex::new(rng),
        }
    }
}

/// Main entry point for Runecast
pub struct RuneEngine {
    store: Arc<dyn PersistenceGateway>,
    interpreter: Option<Arc<dyn InterpretationGateway>>,
    billing: Option<Arc<dyn BillingGateway>>,
    premium_price_id: Option<String>,
    /// Fetched once from the store, then shared read-only
    catalog: OnceCell<Arc<RuneCatalog>>,
    notifier: Notifier,
    rng: Mutex<StdRng>,
}

impl RuneEngine {
    pub fn builder(store: Arc<dyn PersistenceGateway>) -> RuneEngineBuilder {
        RuneEngineBuilder {
            store,
            interpreter: None,
            billing: None,
            premium_price_id: None,
            seed: None,
        }
    }

    /// Open the local database and wire up whichever remote gateways are configured.
    pub fn open(config: &RuneConfig) -> RuneResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = Storage::new(config.database_path())?;
        info!(data_dir = %config.data_dir.display(), "opened runecast storage");

        let mut builder = Self::builder(Arc::new(storage));
        if let Some(url) = &config.interpretation_url {
            builder = builder.interpreter(Arc::new(HttpInterpreter::new(
                url.clone(),
                config.request_timeout(),
            )?));
        }
        if let Some(url) = &config.billing_url {
            builder = builder.billing(Arc::new(HttpBilling::new(
                url.clone(),
                config.request_timeout(),
            )?));
        }
        if let Some(price) = &config.premium_price_id {
            builder = builder.premium_price_id(price.clone());
        }
        Ok(builder.build())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn has_interpreter(&self) -> bool {
        self.interpreter.is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Catalog
    // ═══════════════════════════════════════════════════════════════════════

    /// The rune catalog, fetched from the store on first use.
    pub async fn catalog(&self) -> RuneResult<Arc<RuneCatalog>> {
        let result = self
            .catalog
            .get_or_try_init(|| async {
                let runes = self.store.fetch_runes().await?;
                debug!(count = runes.len(), "catalog fetched");
                RuneCatalog::from_runes(runes).map(Arc::new)
            })
            .await
            .cloned();
        self.report("Could not load runes", result)
    }

    /// Resolve a stored divination back into drawn runes with their positions.
    pub async fn describe(&self, divination: &Divination) -> RuneResult<Vec<DrawnRune>> {
        let catalog = self.catalog().await?;
        divination
            .runes
            .iter()
            .map(|placement| {
                let rune = catalog
                    .get(&placement.rune_id)
                    .cloned()
                    .ok_or_else(|| RuneError::RuneNotFound(placement.rune_id.to_string()))?;
                let position = divination
                    .divination_type
                    .position(&placement.position)
                    .copied()
                    .ok_or_else(|| {
                        RuneError::Storage(format!(
                            "unknown position {} for {}",
                            placement.position, divination.divination_type
                        ))
                    })?;
                Ok(DrawnRune {
                    rune,
                    position,
                    orientation: placement.orientation,
                })
            })
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Readings
    // ═══════════════════════════════════════════════════════════════════════

    /// Validate the question, check entitlement, draw and deal a new reading.
    ///
    /// An invalid question fails before any gateway call.
    pub async fn start_reading(
        &self,
        session: &Session,
        spread: SpreadType,
        question: &str,
    ) -> RuneResult<Reading> {
        let mut reading = Reading::new(spread);
        reading.begin(question)?;

        if spread.requires_premium() && !self.is_premium(session).await? {
            return self.report(
                "Premium spread",
                Err(RuneError::SubscriptionRequired(
                    spread.display_name().to_string(),
                )),
            );
        }

        let catalog = self.catalog().await?;
        let drawn = {
            let mut rng = self.rng.lock();
            draw_spread(catalog.runes(), spread, &mut *rng)
        };
        reading.deal(self.report("Could not draw runes", drawn)?)?;

        info!(user = %session.user_id, spread = %spread, "reading dealt");
        Ok(reading)
    }

    /// Reveal one position; persists the reading the moment it completes.
    pub async fn reveal(
        &self,
        session: &Session,
        reading: &mut Reading,
        index: usize,
        scope: &ReadingScope,
    ) -> RuneResult<RevealStatus> {
        match reading.reveal(index)? {
            RevealOutcome::AlreadyRevealed => Ok(RevealStatus::AlreadyRevealed),
            RevealOutcome::Revealed { remaining } => Ok(RevealStatus::Revealed { remaining }),
            RevealOutcome::Completed(ticket) => {
                let saved = self.persist(session, reading, ticket, scope).await?;
                Ok(RevealStatus::Completed { saved })
            }
        }
    }

    /// Reveal every remaining position in order.
    pub async fn reveal_all(
        &self,
        session: &Session,
        reading: &mut Reading,
        scope: &ReadingScope,
    ) -> RuneResult<RevealStatus> {
        let mut status = RevealStatus::AlreadyRevealed;
        for index in 0..reading.runes().len() {
            match self.reveal(session, reading, index, scope).await? {
                RevealStatus::AlreadyRevealed => {}
                other => status = other,
            }
        }
        Ok(status)
    }

    /// Store a completion ticket without touching any reading.
    ///
    /// Lets a front end persist in the background and apply the result with
    /// [`Reading::mark_saved`] later; stale cycles are ignored there.
    pub async fn save_completed(
        &self,
        session: &Session,
        ticket: &CompletedReading,
        scope: &ReadingScope,
    ) -> RuneResult<Divination> {
        let payload = ticket.to_new_divination(session.user_id.clone())?;
        let result = scope
            .run(self.store.insert_divination(session, payload))
            .await;
        match &result {
            Ok(stored) => info!(id = %stored.id, spread = %stored.divination_type, "reading saved"),
            Err(e) => warn!(error = %e, "saving reading failed"),
        }
        self.report("Could not save your reading", result)
    }

    /// Retry persisting a reading whose save failed.
    pub async fn retry_save(
        &self,
        session: &Session,
        reading: &mut Reading,
        scope: &ReadingScope,
    ) -> RuneResult<Option<DivinationId>> {
        let ticket = reading.retry_save()?;
        self.persist(session, reading, ticket, scope).await
    }

    /// Validate notes and attach them to the saved reading.
    pub async fn attach_notes(
        &self,
        session: &Session,
        reading: &mut Reading,
        notes: &str,
        scope: &ReadingScope,
    ) -> RuneResult<()> {
        let notes = validate_notes(notes)?;
        let id = reading.divination_id().ok_or_else(|| {
            RuneError::InvalidTransition("reading has not been saved yet".to_string())
        })?;
        let cycle = reading.cycle();

        let result = scope
            .run(self.store.update_divination_notes(session, id, notes))
            .await;
        let stored = self.report("Could not save notes", result)?;

        if reading.cycle() == cycle {
            reading.set_notes(stored.notes.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }

    /// Request an interpretation of a complete reading.
    ///
    /// The reading's interpretation state tracks loading / failed / ready;
    /// calling again after a failure is the retry.
    pub async fn interpret(
        &self,
        session: &Session,
        reading: &mut Reading,
        scope: &ReadingScope,
    ) -> RuneResult<String> {
        let interpreter = self.interpreter.clone().ok_or_else(|| {
            RuneError::GatewayUnavailable("no interpretation service configured".to_string())
        })?;
        let cycle = reading.start_interpretation()?;
        let request =
            InterpretationRequest::new(reading.spread(), reading.runes(), reading.question());

        let result = scope.run(interpreter.interpret(session, &request)).await;
        match &result {
            Ok(text) => {
                reading.finish_interpretation(cycle, Ok(text.clone()));
            }
            Err(RuneError::Cancelled) => reading.abandon_interpretation(cycle),
            Err(e) => {
                reading.finish_interpretation(cycle, Err(e.to_string()));
            }
        }
        self.report("Interpretation failed", result)
    }

    /// Ask a yes/no question: draw one rune, reveal it, save it, map the answer.
    pub async fn yes_no(
        &self,
        session: &Session,
        question: &str,
        scope: &ReadingScope,
    ) -> RuneResult<(Reading, YesNoAnswer)> {
        let mut reading = self.start_reading(session, SpreadType::YesNo, question).await?;
        self.reveal_all(session, &mut reading, scope).await?;
        let answer = reading
            .runes()
            .first()
            .map(YesNoAnswer::for_drawn)
            .ok_or_else(|| RuneError::InvalidTransition("no rune drawn".to_string()))?;
        Ok((reading, answer))
    }

    async fn persist(
        &self,
        session: &Session,
        reading: &mut Reading,
        ticket: CompletedReading,
        scope: &ReadingScope,
    ) -> RuneResult<Option<DivinationId>> {
        reading.mark_saving(ticket.cycle());
        match self.save_completed(session, &ticket, scope).await {
            Ok(stored) => {
                reading.mark_saved(ticket.cycle(), stored.id);
                Ok(Some(stored.id))
            }
            Err(RuneError::Cancelled) => {
                reading.abandon_save(ticket.cycle());
                Err(RuneError::Cancelled)
            }
            Err(e) => {
                reading.mark_save_failed(ticket.cycle(), e.to_string());
                Ok(None)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // History
    // ═══════════════════════════════════════════════════════════════════════

    /// The user's stored divinations, newest first
    pub async fn history(&self, session: &Session) -> RuneResult<Vec<Divination>> {
        let result = self.store.list_divinations(session).await;
        self.report("Could not load history", result)
    }

    pub async fn divination(&self, session: &Session, id: DivinationId) -> RuneResult<Divination> {
        let result = self
            .store
            .get_divination(session, id)
            .await
            .and_then(|found| {
                found.ok_or_else(|| RuneError::DivinationNotFound(id.to_string_repr()))
            });
        self.report("Could not load divination", result)
    }

    pub async fn update_notes(
        &self,
        session: &Session,
        id: DivinationId,
        notes: &str,
    ) -> RuneResult<Divination> {
        let notes = validate_notes(notes)?;
        let result = self.store.update_divination_notes(session, id, notes).await;
        self.report("Could not save notes", result)
    }

    pub async fn delete_divination(&self, session: &Session, id: DivinationId) -> RuneResult<()> {
        let result = self.store.delete_divination(session, id).await;
        let result = self.report("Could not delete divination", result);
        if result.is_ok() {
            self.notifier
                .publish(Notification::success("Deleted", "Divination removed from history"));
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Daily Rune
    // ═══════════════════════════════════════════════════════════════════════

    /// The user's rune for `date`, drawing one if none exists yet.
    pub async fn daily_rune(&self, session: &Session, date: NaiveDate) -> RuneResult<DailyRune> {
        let existing = self.store.get_daily_rune(session, date).await;
        if let Some(daily) = self.report("Could not load daily rune", existing)? {
            return Ok(daily);
        }

        let catalog = self.catalog().await?;
        let drawn = {
            let mut rng = self.rng.lock();
            draw_oriented(catalog.runes(), 1, &mut *rng)
        };
        let (rune, orientation) = drawn?
            .into_iter()
            .next()
            .ok_or(RuneError::InsufficientCatalog {
                requested: 1,
                available: 0,
            })?;

        let daily = DailyRune {
            user_id: session.user_id.clone(),
            date,
            rune_id: rune.id,
            orientation,
            reflection: None,
            created_at: Utc::now().timestamp(),
        };
        let result = self.store.insert_daily_rune(session, daily).await;
        self.report("Could not save daily rune", result)
    }

    /// Attach a reflection to an existing daily rune.
    pub async fn reflect_daily(
        &self,
        session: &Session,
        date: NaiveDate,
        reflection: &str,
    ) -> RuneResult<DailyRune> {
        let reflection = validate_notes(reflection)?;
        let existing = self.store.get_daily_rune(session, date).await;
        let mut daily = self
            .report("Could not load daily rune", existing)?
            .ok_or_else(|| {
                RuneError::InvalidTransition(format!("no daily rune drawn for {date}"))
            })?;
        daily.reflection = reflection;
        let result = self.store.update_daily_rune(session, daily).await;
        self.report("Could not save reflection", result)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Favorites
    // ═══════════════════════════════════════════════════════════════════════

    /// Favorite a rune by id or name
    pub async fn add_favorite(&self, session: &Session, rune: &str) -> RuneResult<FavoriteRune> {
        let catalog = self.catalog().await?;
        let rune_id = catalog.require(rune)?.id.clone();
        let result = self.store.add_favorite(session, &rune_id).await;
        self.report("Could not add favorite", result)
    }

    pub async fn remove_favorite(&self, session: &Session, rune: &str) -> RuneResult<()> {
        let catalog = self.catalog().await?;
        let rune_id = catalog.require(rune)?.id.clone();
        let result = self.store.remove_favorite(session, &rune_id).await;
        self.report("Could not remove favorite", result)
    }

    pub async fn list_favorites(&self, session: &Session) -> RuneResult<Vec<FavoriteRune>> {
        let result = self.store.list_favorites(session).await;
        self.report("Could not load favorites", result)
    }

    pub async fn is_favorite(&self, session: &Session, rune: &str) -> RuneResult<bool> {
        let catalog = self.catalog().await?;
        let rune_id = &catalog.require(rune)?.id;
        Ok(self
            .list_favorites(session)
            .await?
            .iter()
            .any(|f| &f.rune_id == rune_id))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Subscription & Billing
    // ═══════════════════════════════════════════════════════════════════════

    /// The user's subscription, or an inactive record if there is none
    pub async fn subscription(&self, session: &Session) -> RuneResult<Subscription> {
        let result = self
            .store
            .get_subscription(session)
            .await
            .map(|found| found.unwrap_or_else(|| Subscription::inactive(session.user_id.clone())));
        self.report("Could not load subscription", result)
    }

    pub async fn is_premium(&self, session: &Session) -> RuneResult<bool> {
        Ok(self.subscription(session).await?.is_premium(Utc::now()))
    }

    /// Start a checkout and return the URL to open.
    pub async fn start_checkout(
        &self,
        session: &Session,
        price_id: Option<&str>,
    ) -> RuneResult<String> {
        let billing = self.billing()?;
        let price_id = price_id
            .or(self.premium_price_id.as_deref())
            .ok_or_else(|| RuneError::Validation("no price id given or configured".to_string()))?;
        let result = billing.create_checkout(session, price_id).await;
        self.report("Could not start checkout", result)
    }

    pub async fn open_portal(&self, session: &Session) -> RuneResult<String> {
        let billing = self.billing()?;
        let result = billing.customer_portal(session).await;
        self.report("Could not open billing portal", result)
    }

    /// Confirm a finished checkout and return the refreshed subscription.
    pub async fn verify_checkout(
        &self,
        session: &Session,
        checkout_session_id: &str,
    ) -> RuneResult<Subscription> {
        let billing = self.billing()?;
        let result = billing.verify_checkout(session, checkout_session_id).await;
        let verified = self.report("Could not verify checkout", result)?;

        if verified {
            self.notifier.publish(Notification::success(
                "Subscription active",
                "Premium spreads are unlocked",
            ));
        } else {
            self.notifier.publish(Notification::error(
                "Checkout not completed",
                "The payment could not be verified",
            ));
        }
        self.subscription(session).await
    }

    fn billing(&self) -> RuneResult<Arc<dyn BillingGateway>> {
        self.billing.clone().ok_or_else(|| {
            RuneError::GatewayUnavailable("no billing service configured".to_string())
        })
    }

    /// Publish user-facing failures, then hand the result back unchanged.
    fn report<T>(&self, title: &str, result: RuneResult<T>) -> RuneResult<T> {
        if let Err(err) = &result {
            if err.is_user_facing() {
                debug!(title, error = %err, "notifying user");
                self.notifier
                    .publish(Notification::error(title, err.to_string()));
            }
        }
        result
    }
}
