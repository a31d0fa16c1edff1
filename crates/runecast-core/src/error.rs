//! Error types for Runecast

use thiserror::Error;

/// Main error type for Runecast operations
#[derive(Error, Debug)]
pub enum RuneError {
    /// Question, notes or reflection text was rejected before any gateway call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The catalog holds fewer runes than the spread asks for
    #[error("Insufficient catalog: requested {requested} runes but only {available} available")]
    InsufficientCatalog { requested: usize, available: usize },

    /// Drawn runes and spread positions have different lengths
    #[error("Position mismatch: {drawn} runes for {positions} positions")]
    PositionMismatch { drawn: usize, positions: usize },

    /// Reveal index outside the spread
    #[error("Invalid position index {index} (spread has {count} positions)")]
    InvalidPosition { index: usize, count: usize },

    /// Operation not allowed in the reading's current phase
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No authenticated session was supplied
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Spread needs an active premium subscription
    #[error("Subscription required for {0}")]
    SubscriptionRequired(String),

    /// Persistence, interpretation or billing call failed
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway is not configured for this engine
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The reading scope was cancelled while a call was in flight
    #[error("Operation cancelled")]
    Cancelled,

    /// Rune id not present in the catalog
    #[error("Rune not found: {0}")]
    RuneNotFound(String),

    /// Divination not found (or owned by someone else)
    #[error("Divination not found: {0}")]
    DivinationNotFound(String),

    /// Error during storage operations (redb)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuneError {
    /// Whether the error should be surfaced to the user as a notification.
    ///
    /// Validation errors are shown inline by the caller instead, and
    /// cancellation means nobody is left to notify.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, RuneError::Validation(_) | RuneError::Cancelled)
    }
}

impl From<reqwest::Error> for RuneError {
    fn from(err: reqwest::Error) -> Self {
        RuneError::Gateway(err.to_string())
    }
}

/// Result type alias using RuneError
pub type RuneResult<T> = Result<T, RuneError>;
