//! Reveal state machine for a single reading.
//!
//! ```text
//! NotDrawn ──begin(question)──▶ Drawing ──deal(runes)──▶ Drawn
//!                                                         │ reveal(i)
//!                                                         ▼
//!                           Complete ◀──last reveal── PartiallyRevealed
//!                              │
//!                              └──reset()──▶ NotDrawn
//! ```
//!
//! Completion is a one-shot transition: the reveal that turns the last
//! position face up returns [`RevealOutcome::Completed`] carrying a
//! [`CompletedReading`] ticket, and no later reveal can produce another one
//! until the reading is reset. The ticket is what gets persisted.
//!
//! Every reset starts a new draw cycle. Results of gateway calls are tagged
//! with the cycle they belong to so a late response from a discarded cycle
//! never lands on the current one.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{RuneError, RuneResult};
use crate::spread::SpreadType;
use crate::types::{DivinationId, DrawnRune, NewDivination, RunePlacement, UserId};
use crate::validation::{validate_notes, validate_question};

/// Where a reading is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingPhase {
    NotDrawn,
    Drawing,
    /// Runes dealt, all face down
    Drawn,
    /// At least one but not all positions revealed
    PartiallyRevealed,
    Complete,
}

/// Persistence status of a completed reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    Unsaved,
    Saving,
    Saved(DivinationId),
    Failed(String),
}

/// Status of the on-demand interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpretationState {
    Idle,
    Loading,
    Failed(String),
    Ready(String),
}

/// One-shot token produced when the last position is revealed.
///
/// Deliberately not `Clone`: holding it is the right to persist this cycle.
#[derive(Debug, PartialEq, Eq)]
pub struct CompletedReading {
    cycle: u64,
    spread: SpreadType,
    question: Option<String>,
    placements: Vec<RunePlacement>,
}

impl CompletedReading {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn spread(&self) -> SpreadType {
        self.spread
    }

    pub fn placements(&self) -> &[RunePlacement] {
        &self.placements
    }

    /// The payload handed to the persistence gateway
    pub fn to_new_divination(&self, user_id: UserId) -> RuneResult<NewDivination> {
        NewDivination::new(
            user_id,
            self.spread,
            self.placements.clone(),
            self.question.clone(),
        )
    }
}

/// Result of revealing one position
#[derive(Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Position was already face up (or the reading is complete); nothing changed
    AlreadyRevealed,
    Revealed { remaining: usize },
    Completed(CompletedReading),
}

/// In-memory state of one reading, owned by whoever is showing it
#[derive(Debug, Clone)]
pub struct Reading {
    spread: SpreadType,
    phase: ReadingPhase,
    cycle: u64,
    question: Option<String>,
    runes: Vec<DrawnRune>,
    revealed: Vec<bool>,
    save: SaveState,
    notes: Option<String>,
    interpretation: InterpretationState,
}

impl Reading {
    pub fn new(spread: SpreadType) -> Self {
        Self {
            spread,
            phase: ReadingPhase::NotDrawn,
            cycle: 0,
            question: None,
            runes: Vec::new(),
            revealed: Vec::new(),
            save: SaveState::Unsaved,
            notes: None,
            interpretation: InterpretationState::Idle,
        }
    }

    pub fn spread(&self) -> SpreadType {
        self.spread
    }

    pub fn phase(&self) -> ReadingPhase {
        self.phase
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn runes(&self) -> &[DrawnRune] {
        &self.runes
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == ReadingPhase::Complete
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save
    }

    /// Id of the stored divination once the save succeeded
    pub fn divination_id(&self) -> Option<DivinationId> {
        match self.save {
            SaveState::Saved(id) => Some(id),
            _ => None,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn interpretation(&self) -> &InterpretationState {
        &self.interpretation
    }

    /// Submit the question and move to `Drawing`.
    ///
    /// A blank or out-of-bounds question leaves the reading untouched.
    pub fn begin(&mut self, question: &str) -> RuneResult<()> {
        self.expect_phase(ReadingPhase::NotDrawn, "begin")?;
        let question = validate_question(question)?;
        self.question = Some(question);
        self.phase = ReadingPhase::Drawing;
        Ok(())
    }

    /// Lay the drawn runes face down and move to `Drawn`.
    pub fn deal(&mut self, runes: Vec<DrawnRune>) -> RuneResult<()> {
        self.expect_phase(ReadingPhase::Drawing, "deal")?;

        let expected = self.spread.position_count();
        if runes.len() != expected {
            return Err(RuneError::PositionMismatch {
                drawn: runes.len(),
                positions: expected,
            });
        }
        let distinct: HashSet<_> = runes.iter().map(|d| &d.rune.id).collect();
        if distinct.len() != runes.len() {
            return Err(RuneError::Validation(
                "a spread cannot hold the same rune twice".to_string(),
            ));
        }

        self.revealed = vec![false; runes.len()];
        self.runes = runes;
        self.phase = ReadingPhase::Drawn;
        debug!(spread = %self.spread, cycle = self.cycle, "runes dealt");
        Ok(())
    }

    /// Turn one position face up.
    ///
    /// Monotonic and idempotent; the completing reveal is the only call that
    /// ever returns [`RevealOutcome::Completed`] for this cycle.
    pub fn reveal(&mut self, index: usize) -> RuneResult<RevealOutcome> {
        match self.phase {
            ReadingPhase::NotDrawn | ReadingPhase::Drawing => {
                return Err(RuneError::InvalidTransition(
                    "cannot reveal before the runes are dealt".to_string(),
                ));
            }
            ReadingPhase::Complete => {
                self.check_index(index)?;
                return Ok(RevealOutcome::AlreadyRevealed);
            }
            ReadingPhase::Drawn | ReadingPhase::PartiallyRevealed => {}
        }

        self.check_index(index)?;
        if self.revealed[index] {
            return Ok(RevealOutcome::AlreadyRevealed);
        }
        self.revealed[index] = true;

        let remaining = self.revealed.len() - self.revealed_count();
        if remaining > 0 {
            self.phase = ReadingPhase::PartiallyRevealed;
            return Ok(RevealOutcome::Revealed { remaining });
        }

        self.phase = ReadingPhase::Complete;
        debug!(spread = %self.spread, cycle = self.cycle, "reading complete");
        Ok(RevealOutcome::Completed(self.ticket()))
    }

    /// Reveal every remaining position in order.
    ///
    /// Returns the completion ticket if this call completed the reading.
    pub fn reveal_all(&mut self) -> RuneResult<Option<CompletedReading>> {
        let mut ticket = None;
        for index in 0..self.revealed.len() {
            if let RevealOutcome::Completed(t) = self.reveal(index)? {
                ticket = Some(t);
            }
        }
        Ok(ticket)
    }

    /// Record that the completion ticket is being persisted
    pub fn mark_saving(&mut self, cycle: u64) -> bool {
        if !self.is_current(cycle) {
            return false;
        }
        self.save = SaveState::Saving;
        true
    }

    /// Record a successful save. Ignored if the reading was reset meanwhile.
    pub fn mark_saved(&mut self, cycle: u64, id: DivinationId) -> bool {
        if !self.is_current(cycle) {
            return false;
        }
        self.save = SaveState::Saved(id);
        true
    }

    /// Record a failed save. Ignored if the reading was reset meanwhile.
    pub fn mark_save_failed(&mut self, cycle: u64, message: impl Into<String>) -> bool {
        if !self.is_current(cycle) {
            return false;
        }
        self.save = SaveState::Failed(message.into());
        true
    }

    /// Issue a fresh completion ticket after a failed save.
    ///
    /// Only a failed save can be retried, so a reading is stored at most once.
    pub fn retry_save(&mut self) -> RuneResult<CompletedReading> {
        if self.phase != ReadingPhase::Complete {
            return Err(RuneError::InvalidTransition(
                "reading is not complete".to_string(),
            ));
        }
        match self.save {
            SaveState::Failed(_) => {
                self.save = SaveState::Saving;
                Ok(self.ticket())
            }
            _ => Err(RuneError::InvalidTransition(format!(
                "nothing to retry (save state: {:?})",
                self.save
            ))),
        }
    }

    /// Set notes locally. Persisting them is the engine's job.
    pub fn set_notes(&mut self, notes: &str) -> RuneResult<()> {
        if self.phase != ReadingPhase::Complete {
            return Err(RuneError::InvalidTransition(
                "notes can only be added to a complete reading".to_string(),
            ));
        }
        self.notes = validate_notes(notes)?;
        Ok(())
    }

    /// Enter `Loading`. Only a complete reading can be interpreted.
    pub fn start_interpretation(&mut self) -> RuneResult<u64> {
        if self.phase != ReadingPhase::Complete {
            return Err(RuneError::InvalidTransition(
                "interpretation is only available once every rune is revealed".to_string(),
            ));
        }
        self.interpretation = InterpretationState::Loading;
        Ok(self.cycle)
    }

    pub fn finish_interpretation(&mut self, cycle: u64, result: Result<String, String>) -> bool {
        if !self.is_current(cycle) {
            return false;
        }
        self.interpretation = match result {
            Ok(text) => InterpretationState::Ready(text),
            Err(message) => InterpretationState::Failed(message),
        };
        true
    }

    /// Drop back to `Idle` after a cancelled request
    pub(crate) fn abandon_interpretation(&mut self, cycle: u64) {
        if self.is_current(cycle) && self.interpretation == InterpretationState::Loading {
            self.interpretation = InterpretationState::Idle;
        }
    }

    /// A save cancelled mid-flight becomes retryable, like any other failure.
    pub(crate) fn abandon_save(&mut self, cycle: u64) {
        if self.is_current(cycle) && self.save == SaveState::Saving {
            self.save = SaveState::Failed("save cancelled".to_string());
        }
    }

    /// Discard everything and start a new draw cycle.
    pub fn reset(&mut self) {
        self.phase = ReadingPhase::NotDrawn;
        self.cycle += 1;
        self.question = None;
        self.runes.clear();
        self.revealed.clear();
        self.save = SaveState::Unsaved;
        self.notes = None;
        self.interpretation = InterpretationState::Idle;
    }

    fn is_current(&self, cycle: u64) -> bool {
        self.cycle == cycle && self.phase == ReadingPhase::Complete
    }

    fn ticket(&self) -> CompletedReading {
        CompletedReading {
            cycle: self.cycle,
            spread: self.spread,
            question: self.question.clone(),
            placements: self.runes.iter().map(DrawnRune::placement).collect(),
        }
    }

    fn check_index(&self, index: usize) -> RuneResult<()> {
        if index >= self.revealed.len() {
            return Err(RuneError::InvalidPosition {
                index,
                count: self.revealed.len(),
            });
        }
        Ok(())
    }

    fn expect_phase(&self, expected: ReadingPhase, action: &str) -> RuneResult<()> {
        if self.phase != expected {
            return Err(RuneError::InvalidTransition(format!(
                "cannot {action} while {:?}",
                self.phase
            )));
        }
        Ok(())
    }
}
