//! drag::controller
//!
//! The drag state machine.
//!
//! # Phases
//!
//! ```text
//! Idle -> Dragging -> Releasing -> Idle                  (unchanged or rejected)
//!                               -> Committing -> Committed  -> Idle
//!                                             -> RolledBack -> Idle
//!      -> Dragging -> Cancelled -> Idle
//! ```
//!
//! The active session and the dispatched commits are tracked separately:
//! once a drop is handed to the engine the session returns to `Idle` and
//! the commit lives on as a [`PendingCommit`] until it settles. A new drag
//! may start while commits are still pending.
//!
//! The controller never touches the board. It only knows which card is
//! being dragged, where it came from and where it would land.
//!
//! # Invariants
//!
//! - Every phase change is checked against [`DragPhase::can_advance_to`]
//! - At most one session is active
//! - A disabled card cannot be picked up
//! - A rolled-back commit leaves a dismissible error message

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::board::Card;
use crate::core::ops::OpId;
use crate::core::types::{CardId, Slot};

/// Errors from driving the state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DragError {
    /// The card is marked disabled.
    #[error("card '{0}' cannot be dragged")]
    CardDisabled(CardId),

    /// The card is not on the visible board.
    #[error("card '{0}' is not on the board")]
    CardNotFound(CardId),

    /// A session is already in progress.
    #[error("already dragging '{0}'")]
    SessionActive(CardId),

    /// The operation is not valid in the current phase.
    #[error("cannot {operation} while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: DragPhase,
    },

    /// The target names a column that is not on the board.
    #[error("no drop target at {0}")]
    InvalidTarget(Slot),

    /// A transition outside the phase table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: DragPhase, to: DragPhase },
}

/// Phase of a drag or of a dispatched commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Dragging,
    Releasing,
    Committing,
    Committed,
    RolledBack,
    Cancelled,
}

impl DragPhase {
    /// The transition table.
    pub fn can_advance_to(self, next: DragPhase) -> bool {
        use DragPhase::*;
        matches!(
            (self, next),
            (Idle, Dragging)
                | (Dragging, Releasing)
                | (Dragging, Cancelled)
                | (Releasing, Idle)
                | (Releasing, Committing)
                | (Committing, Committed)
                | (Committing, RolledBack)
                | (Committed, Idle)
                | (RolledBack, Idle)
                | (Cancelled, Idle)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DragPhase::Idle => "idle",
            DragPhase::Dragging => "dragging",
            DragPhase::Releasing => "releasing",
            DragPhase::Committing => "committing",
            DragPhase::Committed => "committed",
            DragPhase::RolledBack => "rolled back",
            DragPhase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DragPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pick-up of one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragSession {
    pub card: CardId,
    pub source: Slot,
    pub target: Slot,
}

impl DragSession {
    /// Whether the target is the slot the card was picked up from.
    pub fn is_unchanged(&self) -> bool {
        self.source == self.target
    }
}

/// The active session, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "session", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    Releasing(DragSession),
    Cancelled(DragSession),
}

impl DragState {
    pub fn phase(&self) -> DragPhase {
        match self {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging(_) => DragPhase::Dragging,
            DragState::Releasing(_) => DragPhase::Releasing,
            DragState::Cancelled(_) => DragPhase::Cancelled,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(s) | DragState::Releasing(s) | DragState::Cancelled(s) => Some(s),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

/// A drop that was handed to the engine and has not settled yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCommit {
    pub op_id: OpId,
    pub session: DragSession,
    pub phase: DragPhase,
}

/// How `end_drag` finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndDrag {
    /// Dropped at the source; nothing to do.
    Unchanged,
    /// The policy refused the drop; nothing changed.
    Rejected,
    /// Applied optimistically; the commit is in flight.
    Dispatched(OpId),
}

/// The drag state machine.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    pending: Vec<PendingCommit>,
    error: Option<String>,
    history: VecDeque<DragPhase>,
    history_limit: usize,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_HISTORY_LIMIT)
    }
}

impl DragController {
    /// Create an idle controller keeping at most `history_limit` phases.
    pub fn new(history_limit: usize) -> Self {
        let mut history = VecDeque::with_capacity(history_limit.min(64));
        history.push_back(DragPhase::Idle);
        Self {
            state: DragState::Idle,
            pending: Vec::new(),
            error: None,
            history,
            history_limit: history_limit.max(1),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn phase(&self) -> DragPhase {
        self.state.phase()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.state.session()
    }

    /// Dispatched commits that have not settled.
    pub fn pending(&self) -> &[PendingCommit] {
        &self.pending
    }

    /// The last commit failure, until dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Recent phases, oldest first.
    pub fn history(&self) -> impl Iterator<Item = DragPhase> + '_ {
        self.history.iter().copied()
    }

    fn record(&mut self, phase: DragPhase) {
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(phase);
    }

    fn check(from: DragPhase, to: DragPhase) -> Result<(), DragError> {
        if from.can_advance_to(to) {
            Ok(())
        } else {
            Err(DragError::InvalidTransition { from, to })
        }
    }

    /// Move the active session to `next`.
    fn advance(&mut self, next: DragState) -> Result<(), DragError> {
        let from = self.phase();
        let to = next.phase();
        Self::check(from, to)?;
        tracing::debug!(
            from = from.as_str(),
            to = to.as_str(),
            card = next.session().map(|s| s.card.as_str()),
            "drag transition"
        );
        self.state = next;
        self.record(to);
        Ok(())
    }

    /// The active session, if it is in `Dragging`.
    ///
    /// `operation` names what the caller was trying to do, for the error.
    pub fn dragging(&self, operation: &'static str) -> Result<&DragSession, DragError> {
        match &self.state {
            DragState::Dragging(session) => Ok(session),
            other => Err(DragError::InvalidPhase {
                operation,
                phase: other.phase(),
            }),
        }
    }

    /// Pick up `card` at `source`. The target starts at the source.
    pub fn start(&mut self, card: &Card, source: Slot) -> Result<&DragSession, DragError> {
        if let Some(session) = self.state.session() {
            return Err(DragError::SessionActive(session.card.clone()));
        }
        if card.disabled {
            return Err(DragError::CardDisabled(card.id.clone()));
        }

        self.advance(DragState::Dragging(DragSession {
            card: card.id.clone(),
            target: source.clone(),
            source,
        }))?;
        self.dragging("start")
    }

    /// Change the target. Returns whether it actually changed.
    pub fn retarget(&mut self, target: Slot) -> Result<bool, DragError> {
        self.dragging("update the target")?;
        match &mut self.state {
            DragState::Dragging(session) if session.target != target => {
                tracing::trace!(card = session.card.as_str(), %target, "drag target");
                session.target = target;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Begin the drop. The returned session is now `Releasing`.
    pub fn release(&mut self) -> Result<DragSession, DragError> {
        let session = self.dragging("end the drag")?.clone();
        self.advance(DragState::Releasing(session.clone()))?;
        Ok(session)
    }

    /// Finish a drop that changes nothing (unchanged or rejected).
    pub fn settle_release(&mut self) -> Result<(), DragError> {
        match self.phase() {
            DragPhase::Releasing => self.advance(DragState::Idle),
            phase => Err(DragError::InvalidPhase {
                operation: "finish the drop",
                phase,
            }),
        }
    }

    /// Hand the releasing session over to a pending commit.
    pub fn dispatch(&mut self, op_id: OpId) -> Result<&PendingCommit, DragError> {
        let session = match &self.state {
            DragState::Releasing(session) => session.clone(),
            other => {
                return Err(DragError::InvalidPhase {
                    operation: "dispatch a commit",
                    phase: other.phase(),
                })
            }
        };

        Self::check(DragPhase::Releasing, DragPhase::Committing)?;
        tracing::debug!(
            op_id = op_id.short(),
            card = session.card.as_str(),
            "drag transition releasing -> committing"
        );
        self.record(DragPhase::Committing);
        self.pending.push(PendingCommit {
            op_id,
            session,
            phase: DragPhase::Committing,
        });

        self.state = DragState::Idle;
        self.record(DragPhase::Idle);

        let last = self.pending.len() - 1;
        Ok(&self.pending[last])
    }

    /// Abandon the active drag. Returns the abandoned session.
    pub fn cancel(&mut self) -> Result<DragSession, DragError> {
        let session = self.dragging("cancel")?.clone();
        self.advance(DragState::Cancelled(session.clone()))?;
        self.advance(DragState::Idle)?;
        Ok(session)
    }

    /// Settle a pending commit.
    ///
    /// `failure` carries the human-readable reason when the commit was
    /// rolled back. Returns the commit with its final phase, or `None` if
    /// `op_id` was not dispatched through this controller.
    pub fn settle(
        &mut self,
        op_id: &OpId,
        failure: Option<String>,
    ) -> Result<Option<PendingCommit>, DragError> {
        let Some(at) = self.pending.iter().position(|p| &p.op_id == op_id) else {
            return Ok(None);
        };

        let next = if failure.is_some() {
            DragPhase::RolledBack
        } else {
            DragPhase::Committed
        };
        Self::check(self.pending[at].phase, next)?;
        Self::check(next, DragPhase::Idle)?;

        let mut commit = self.pending.remove(at);
        commit.phase = next;
        tracing::debug!(
            op_id = op_id.short(),
            card = commit.session.card.as_str(),
            to = next.as_str(),
            "commit settled"
        );
        self.record(next);
        self.record(DragPhase::Idle);

        if let Some(message) = failure {
            self.error = Some(message);
        }
        Ok(Some(commit))
    }
}
