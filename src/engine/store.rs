//! engine::store
//!
//! The two board snapshots the engine keeps.
//!
//! - **confirmed**: what the host has acknowledged
//! - **visible**: confirmed plus every operation still awaiting its commit
//!
//! Pending operations are kept in initiation order. Whenever the confirmed
//! snapshot changes underneath them (a rollback, or a fresh snapshot from
//! the host) the visible board is rebuilt by replaying them by card id.

use std::collections::VecDeque;

use crate::core::board::{Board, BoardError};
use crate::core::ops::{OpId, Operation};

/// An operation applied to the visible board but not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub op_id: OpId,
    pub operation: Operation,
}

/// Confirmed and visible snapshots plus the operations between them.
#[derive(Debug, Clone)]
pub struct BoardStore {
    confirmed: Board,
    visible: Board,
    pending: VecDeque<PendingOp>,
}

impl BoardStore {
    /// Start from a host-supplied snapshot; nothing is pending.
    pub fn new(board: Board) -> Self {
        Self {
            visible: board.clone(),
            confirmed: board,
            pending: VecDeque::new(),
        }
    }

    pub fn confirmed(&self) -> &Board {
        &self.confirmed
    }

    pub fn visible(&self) -> &Board {
        &self.visible
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingOp> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply `operation` to the visible board and record it as pending.
    ///
    /// On error nothing changes.
    pub fn begin(&mut self, op_id: OpId, operation: Operation) -> Result<&Board, BoardError> {
        self.visible = self.visible.apply(&operation)?;
        self.pending.push_back(PendingOp { op_id, operation });
        Ok(&self.visible)
    }

    fn take(&mut self, op_id: &OpId) -> Option<PendingOp> {
        let at = self.pending.iter().position(|p| &p.op_id == op_id)?;
        self.pending.remove(at)
    }

    /// The host accepted `op_id`: fold it into the confirmed snapshot.
    ///
    /// The visible board already shows the operation and is left as is.
    pub fn confirm(&mut self, op_id: &OpId) -> Option<Operation> {
        let pending = self.take(op_id)?;
        let op = &pending.operation;
        match self.confirmed.relocate(op.card_id(), &op.target()) {
            Ok(board) => self.confirmed = board,
            Err(e) => {
                tracing::warn!(
                    op_id = op_id.short(),
                    error = %e,
                    "confirmed operation no longer fits the confirmed board"
                );
            }
        }
        Some(pending.operation)
    }

    /// The host refused `op_id`: drop it and rebuild the visible board.
    pub fn reject(&mut self, op_id: &OpId) -> Option<Operation> {
        let pending = self.take(op_id)?;
        self.rebuild();
        Some(pending.operation)
    }

    /// Adopt a fresh confirmed snapshot from the host.
    pub fn replace_confirmed(&mut self, board: Board) {
        self.confirmed = board;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.visible = replay(&self.confirmed, self.pending.iter());
    }
}

/// Replay pending operations on `base`, locating each card by id.
///
/// Operations whose card or target column is gone are skipped.
pub fn replay<'a>(base: &Board, pending: impl IntoIterator<Item = &'a PendingOp>) -> Board {
    let mut board = base.clone();
    for p in pending {
        let op = &p.operation;
        match board.relocate(op.card_id(), &op.target()) {
            Ok(next) => board = next,
            Err(e) => {
                tracing::debug!(op_id = p.op_id.short(), error = %e, "skipping replay");
            }
        }
    }
    board
}
