//! drag::resolve
//!
//! Turns pointer positions and keyboard steps into drop targets.
//!
//! # Pointer resolution
//!
//! The rendering layer lists what it currently shows as drop candidates,
//! each with the center of its on-screen box. [`resolve`] picks the
//! candidate closest to the pointer and maps it to a slot:
//!
//! | Candidate | Slot index |
//! |-----------|------------|
//! | empty column | 0 |
//! | non-empty column | end of the column |
//! | card | the card's index (insert before it) |
//! | last card, pointer below its center | end of the column |
//!
//! Candidates naming cards or columns that are not on the board are
//! skipped, so a stale render never produces a bogus target.
//!
//! # Keyboard stepping
//!
//! [`step`] moves the target one slot at a time. Up and down stay in the
//! column, left and right move to the neighbouring column in board order.
//! Stepping off an edge leaves the target where it was.

use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::types::{CardId, ColumnId, Slot};

/// A point in rendering coordinates. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance; ordering-equivalent to the distance.
    fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// What a candidate stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateKind {
    /// The column's body (drop zone).
    Column { column: ColumnId },
    /// A rendered card.
    Card { column: ColumnId, card: CardId },
}

/// A rendered drop zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropCandidate {
    pub id: String,
    pub kind: CandidateKind,
    pub center: Point,
}

impl DropCandidate {
    pub fn column(column: ColumnId, center: Point) -> Self {
        Self {
            id: format!("column:{}", column),
            kind: CandidateKind::Column { column },
            center,
        }
    }

    pub fn card(column: ColumnId, card: CardId, center: Point) -> Self {
        Self {
            id: format!("card:{}", card),
            kind: CandidateKind::Card { column, card },
            center,
        }
    }
}

/// Supplies the candidates currently rendered.
pub trait DropCandidateProvider {
    fn list_candidates(&self) -> Vec<DropCandidate>;
}

impl DropCandidateProvider for Vec<DropCandidate> {
    fn list_candidates(&self) -> Vec<DropCandidate> {
        self.clone()
    }
}

impl DropCandidateProvider for [DropCandidate] {
    fn list_candidates(&self) -> Vec<DropCandidate> {
        self.to_vec()
    }
}

/// Map the pointer to the slot of the nearest valid candidate.
///
/// Ties go to the candidate listed first. Returns `None` when no candidate
/// refers to something on the board.
pub fn resolve(position: Point, candidates: &[DropCandidate], board: &Board) -> Option<Slot> {
    let mut best: Option<(f64, Slot)> = None;

    for candidate in candidates {
        let Some(slot) = candidate_slot(candidate, position, board) else {
            continue;
        };
        let distance = position.distance_sq(&candidate.center);
        match &best {
            Some((d, _)) if *d <= distance => {}
            _ => best = Some((distance, slot)),
        }
    }

    best.map(|(_, slot)| slot)
}

fn candidate_slot(candidate: &DropCandidate, position: Point, board: &Board) -> Option<Slot> {
    match &candidate.kind {
        CandidateKind::Column { column } => {
            let len = board.column(column)?.len();
            Some(Slot::new(column.clone(), len))
        }
        CandidateKind::Card { column, card } => {
            let col = board.column(column)?;
            let index = col.position(card)?;
            let is_last = index + 1 == col.len();
            if is_last && position.y > candidate.center.y {
                Some(Slot::new(column.clone(), col.len()))
            } else {
                Some(Slot::new(column.clone(), index))
            }
        }
    }
}

/// A keyboard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Highest index a target may take in `column`.
///
/// In the source column the card itself is one of the items, so the last
/// reachable index is `len - 1`; elsewhere the card can land after the last
/// item.
fn ceiling(board: &Board, column: &ColumnId, source: &Slot) -> Option<usize> {
    let len = board.column(column)?.len();
    if *column == source.column {
        Some(len.saturating_sub(1))
    } else {
        Some(len)
    }
}

/// Clamp a directly chosen target to the reachable indices of its column.
///
/// Returns `None` when the column is not on the board.
pub fn clamp_target(board: &Board, source: &Slot, target: &Slot) -> Option<Slot> {
    let max = ceiling(board, &target.column, source)?;
    Some(Slot::new(target.column.clone(), target.index.min(max)))
}

/// Move `current` one step in `direction`.
///
/// `source` is where the dragged card sits on `board`. Steps that would
/// leave the board (or name an unknown column) return `current` unchanged.
pub fn step(board: &Board, source: &Slot, current: &Slot, direction: Direction) -> Slot {
    match direction {
        Direction::Up => Slot::new(current.column.clone(), current.index.saturating_sub(1)),
        Direction::Down => match ceiling(board, &current.column, source) {
            Some(max) => Slot::new(current.column.clone(), (current.index + 1).min(max)),
            None => current.clone(),
        },
        Direction::Left | Direction::Right => {
            let Some(at) = board.column_index(&current.column) else {
                return current.clone();
            };
            let next = match direction {
                Direction::Left => at.checked_sub(1),
                _ => Some(at + 1),
            };
            let Some(column) = next.and_then(|i| board.columns().get(i)) else {
                return current.clone();
            };
            let max = ceiling(board, &column.id, source).unwrap_or(0);
            Slot::new(column.id.clone(), current.index.min(max))
        }
    }
}
