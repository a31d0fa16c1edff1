//! Runecast Core Library
//!
//! Elder Futhark rune divination: spreads, draws, readings and their history.
//!
//! ## Overview
//!
//! A user picks a spread, asks a question and the engine draws distinct runes
//! from the 24-rune catalog, each upright or reversed with equal chance, and
//! maps them onto the spread's named positions. Runes are revealed one at a
//! time; the moment the last one is revealed the reading is stored exactly
//! once. Interpretations, notes, a daily rune, favorites and premium spreads
//! sit on top.
//!
//! ## Layout
//!
//! - [`catalog`], [`spread`], [`draw`]: the fixed data and the sampling algorithm
//! - [`reading`]: the reveal state machine, independent of any I/O
//! - [`gateway`]: async seams for persistence, interpretation and billing
//! - [`storage`]: the local redb implementation of persistence
//! - [`engine`]: [`RuneEngine`] wiring all of the above together
//!
//! ## Quick Start
//!
//! ```ignore
//! use runecast_core::{ReadingScope, RuneConfig, RuneEngine, Session, SpreadType, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RuneEngine::open(&RuneConfig::load("~/.runecast")?)?;
//!     let session = Session::new(UserId::new("astrid"));
//!     let scope = ReadingScope::new();
//!
//!     let mut reading = engine
//!         .start_reading(&session, SpreadType::ThreeRune, "Where is this path leading?")
//!         .await?;
//!     engine.reveal_all(&session, &mut reading, &scope).await?;
//!
//!     for drawn in reading.runes() {
//!         println!("{}: {} ({})", drawn.position.label, drawn.rune.name, drawn.orientation);
//!     }
//!     Ok(())
//! }
//! ```

pub mod billing;
pub mod catalog;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod interpretation;
pub mod logging;
pub mod notify;
pub mod reading;
pub mod scope;
pub mod session;
pub mod spread;
pub mod storage;
pub mod types;
pub mod validation;
pub mod yes_no;

// Re-exports
pub use billing::HttpBilling;
pub use catalog::RuneCatalog;
pub use config::RuneConfig;
pub use engine::{RevealStatus, RuneEngine, RuneEngineBuilder};
pub use error::{RuneError, RuneResult};
pub use gateway::{
    BillingGateway, InterpretationGateway, InterpretationRequest, PersistenceGateway, RuneData,
};
pub use interpretation::HttpInterpreter;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use reading::{
    CompletedReading, InterpretationState, Reading, ReadingPhase, RevealOutcome, SaveState,
};
pub use scope::ReadingScope;
pub use session::{AuthState, Session};
pub use spread::{PositionSpec, SpreadType};
pub use storage::Storage;
pub use types::*;
pub use yes_no::YesNoAnswer;
