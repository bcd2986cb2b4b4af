//! core::ops
//!
//! Board operations: relocating a card across columns or within one.
//!
//! A [`MoveOperation`] whose source and target column are the same is a
//! reorder in disguise; [`Operation::from_move`] normalizes it so hosts
//! always receive within-column relocations through `reorder_card`.
//!
//! # Index semantics
//!
//! `to_index` is applied remove-then-insert: the card is removed from its
//! source column and inserted at `min(to_index, len)` of the target column,
//! where `len` is measured after the removal. Within a single column this is
//! the card's final position.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{CardId, ColumnId, Slot};

/// Unique identifier for a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(String);

impl OpId {
    /// Generate a new unique operation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an OpId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl Default for OpId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relocate a card from one column to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOperation {
    pub card_id: CardId,
    pub from_column: ColumnId,
    pub from_index: usize,
    pub to_column: ColumnId,
    pub to_index: usize,
}

impl MoveOperation {
    /// Build a move from a source and a target slot.
    pub fn between(card_id: CardId, from: Slot, to: Slot) -> Self {
        Self {
            card_id,
            from_column: from.column,
            from_index: from.index,
            to_column: to.column,
            to_index: to.index,
        }
    }
}

/// Relocate a card within a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOperation {
    pub card_id: CardId,
    pub column: ColumnId,
    pub from_index: usize,
    pub to_index: usize,
}

/// A normalized board operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Cross-column relocation.
    Move(MoveOperation),
    /// Within-column relocation.
    Reorder(ReorderOperation),
}

impl Operation {
    /// Normalize a move: same-column moves become reorders.
    pub fn from_move(op: MoveOperation) -> Self {
        if op.from_column == op.to_column {
            Operation::Reorder(ReorderOperation {
                card_id: op.card_id,
                column: op.from_column,
                from_index: op.from_index,
                to_index: op.to_index,
            })
        } else {
            Operation::Move(op)
        }
    }

    /// Normalize an operation that may carry a same-column move.
    pub fn normalize(self) -> Self {
        match self {
            Operation::Move(op) => Self::from_move(op),
            reorder => reorder,
        }
    }

    /// The card being relocated.
    pub fn card_id(&self) -> &CardId {
        match self {
            Operation::Move(op) => &op.card_id,
            Operation::Reorder(op) => &op.card_id,
        }
    }

    /// Where the card starts.
    pub fn source(&self) -> Slot {
        match self {
            Operation::Move(op) => Slot::new(op.from_column.clone(), op.from_index),
            Operation::Reorder(op) => Slot::new(op.column.clone(), op.from_index),
        }
    }

    /// Where the card lands.
    pub fn target(&self) -> Slot {
        match self {
            Operation::Move(op) => Slot::new(op.to_column.clone(), op.to_index),
            Operation::Reorder(op) => Slot::new(op.column.clone(), op.to_index),
        }
    }

    /// Columns whose order this operation changes: one for a reorder, two
    /// for a move (source first).
    pub fn columns(&self) -> Vec<ColumnId> {
        match self {
            Operation::Move(op) => vec![op.from_column.clone(), op.to_column.clone()],
            Operation::Reorder(op) => vec![op.column.clone()],
        }
    }

    /// Short verb for logs.
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Move(_) => "move",
            Operation::Reorder(_) => "reorder",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} -> {}",
            self.verb(),
            self.card_id(),
            self.source(),
            self.target()
        )
    }
}
