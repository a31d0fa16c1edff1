//! Core types for Runecast

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

use crate::error::{RuneError, RuneResult};
use crate::spread::{PositionSpec, SpreadType};

/// Catalog identifier of a rune (lower-case slug such as `fehu`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuneId(pub String);

impl RuneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared so ids minted within one millisecond still increase
static DIVINATION_IDS: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Unique identifier for a stored divination
///
/// Uses monotonic ULIDs so records sort by creation time, even when several
/// are created in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DivinationId(pub Ulid);

impl DivinationId {
    /// Create a new DivinationId, greater than every id created before it
    pub fn new() -> Self {
        // Overflow needs 2^80 ids in one millisecond
        let ulid = DIVINATION_IDS.lock().generate().unwrap_or_else(|_| Ulid::new());
        Self(ulid)
    }

    /// Convert to string representation
    pub fn to_string_repr(&self) -> String {
        self.0.to_string()
    }

    /// Parse from string representation
    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for DivinationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DivinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a drawn rune lies upright or reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Upright,
    Reversed,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Upright => "upright",
            Orientation::Reversed => "reversed",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three families of eight runes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aett {
    Freyr,
    Hagal,
    Tyr,
}

impl std::fmt::Display for Aett {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Aett::Freyr => "Freyr's Aett",
            Aett::Hagal => "Hagal's Aett",
            Aett::Tyr => "Tyr's Aett",
        };
        f.write_str(name)
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rune {
    pub id: RuneId,
    pub name: String,
    /// Unicode runic character
    pub glyph: String,
    pub phonetic: String,
    pub meaning: String,
    pub keywords: Vec<String>,
    /// Interpretation when drawn upright
    pub upright: String,
    /// Interpretation when drawn reversed (absent for symmetrical runes)
    pub reversed: Option<String>,
    pub element: Option<String>,
    pub aett: Option<Aett>,
    /// Ordinal position in the futhark (1-based)
    pub position: u8,
}

impl Rune {
    /// Interpretation text that applies to the given orientation.
    ///
    /// Reversed runes without a reversed reading fall back to the upright text.
    pub fn interpretation(&self, orientation: Orientation) -> &str {
        match orientation {
            Orientation::Upright => &self.upright,
            Orientation::Reversed => self.reversed.as_deref().unwrap_or(&self.upright),
        }
    }
}

/// A rune placed in a spread position with a random orientation.
///
/// Lives only in memory until the reading completes.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnRune {
    pub rune: Rune,
    pub position: PositionSpec,
    pub orientation: Orientation,
}

impl DrawnRune {
    /// The persisted form of this placement
    pub fn placement(&self) -> RunePlacement {
        RunePlacement {
            rune_id: self.rune.id.clone(),
            position: self.position.name.to_string(),
            orientation: self.orientation,
        }
    }

    pub fn interpretation(&self) -> &str {
        self.rune.interpretation(self.orientation)
    }
}

/// Stored `{rune_id, position, orientation}` tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunePlacement {
    pub rune_id: RuneId,
    pub position: String,
    pub orientation: Orientation,
}

/// Payload submitted to the persistence gateway when a reading completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDivination {
    pub user_id: UserId,
    pub divination_type: SpreadType,
    pub runes: Vec<RunePlacement>,
    pub question: Option<String>,
}

impl NewDivination {
    /// Build a payload, checking the placement count, distinctness and that
    /// every position belongs to the spread.
    pub fn new(
        user_id: UserId,
        divination_type: SpreadType,
        runes: Vec<RunePlacement>,
        question: Option<String>,
    ) -> RuneResult<Self> {
        let expected = divination_type.position_count();
        if runes.len() != expected {
            return Err(RuneError::PositionMismatch {
                drawn: runes.len(),
                positions: expected,
            });
        }
        let mut seen = std::collections::HashSet::new();
        let mut filled = std::collections::HashSet::new();
        for placement in &runes {
            if !seen.insert(&placement.rune_id) {
                return Err(RuneError::Validation(format!(
                    "rune {} appears twice in one divination",
                    placement.rune_id
                )));
            }
            if divination_type.position(&placement.position).is_none() {
                return Err(RuneError::Validation(format!(
                    "{} has no position named {}",
                    divination_type, placement.position
                )));
            }
            if !filled.insert(placement.position.as_str()) {
                return Err(RuneError::Validation(format!(
                    "position {} is filled twice",
                    placement.position
                )));
            }
        }
        Ok(Self {
            user_id,
            divination_type,
            runes,
            question,
        })
    }
}

/// A completed, persisted spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divination {
    pub id: DivinationId,
    pub user_id: UserId,
    pub divination_type: SpreadType,
    pub runes: Vec<RunePlacement>,
    pub question: Option<String>,
    pub notes: Option<String>,
    /// Unix timestamp of creation
    pub created_at: i64,
}

impl Divination {
    /// Materialize a stored record from a submitted payload
    pub fn from_new(new: NewDivination) -> Self {
        Self {
            id: DivinationId::new(),
            user_id: new.user_id,
            divination_type: new.divination_type,
            runes: new.runes,
            question: new.question,
            notes: None,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// The rune drawn for a user on a given calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRune {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub rune_id: RuneId,
    pub orientation: Orientation,
    pub reflection: Option<String>,
    pub created_at: i64,
}

/// A rune bookmarked by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRune {
    pub user_id: UserId,
    pub rune_id: RuneId,
    pub created_at: i64,
}

/// Billing state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Inactive,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

/// Billing record, written only by the checkout verification flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: UserId,
    pub status: SubscriptionStatus,
    pub plan_type: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

impl Subscription {
    /// Record for a user who never subscribed
    pub fn inactive(user_id: UserId) -> Self {
        Self {
            user_id,
            status: SubscriptionStatus::Inactive,
            plan_type: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    /// Active status and the current period has not ended.
    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.current_period_end.map_or(true, |end| end > now)
    }
}
